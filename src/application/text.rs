//! Plain-text helpers shared by search, feeds, structured data and OG images.

use std::{borrow::Cow, cell::RefCell, rc::Rc};

use lol_html::{
    HandlerResult, RewriteStrSettings, doc_text, element, html_content::EndTag, rewrite_str,
};
use quick_xml::escape::unescape_with;
use tracing::warn;

const ELLIPSIS: &str = "...";

/// Elements whose boundaries separate words in the extracted text.
const BLOCK_ELEMENTS: &str = "address, article, aside, blockquote, br, dd, details, div, dl, dt, \
     figcaption, figure, h1, h2, h3, h4, h5, h6, hr, li, ol, p, pre, section, summary, table, \
     td, th, tr, ul";

/// Text content of rendered HTML with entities decoded and whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let buffer = Rc::new(RefCell::new(String::with_capacity(html.len() / 2)));

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(BLOCK_ELEMENTS, {
                let buffer = Rc::clone(&buffer);
                move |el| {
                    buffer.borrow_mut().push(' ');
                    if let Some(handlers) = el.end_tag_handlers() {
                        let buffer = Rc::clone(&buffer);
                        handlers.push(Box::new(move |_end: &mut EndTag<'_>| -> HandlerResult {
                            buffer.borrow_mut().push(' ');
                            Ok(())
                        }) as lol_html::EndTagHandler<'static>);
                    }
                    Ok(())
                }
            })],
            document_content_handlers: vec![doc_text!({
                let buffer = Rc::clone(&buffer);
                move |chunk| {
                    buffer.borrow_mut().push_str(chunk.as_str());
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    );
    if let Err(err) = result {
        warn!(target = "application::text", error = %err, "failed to extract text from html");
    }

    let raw = buffer.take();
    collapse_whitespace(&decode_entities(&raw))
}

/// Collapse runs of whitespace to single spaces and trim both ends.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters including a trailing `...`.
///
/// Cuts on a char boundary and trims trailing whitespace before appending
/// the ellipsis. Input that already fits is returned unchanged.
pub fn truncate_with_ellipsis(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let cut: String = input.chars().take(keep).collect();
    format!("{}{ELLIPSIS}", cut.trim_end())
}

/// Plain-text excerpt of rendered HTML.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    truncate_with_ellipsis(&html_to_text(html), max_chars)
}

/// Text chunks keep their source entities; unknown named entities stay as written.
fn decode_entities(input: &str) -> Cow<'_, str> {
    unescape_with(input, |entity| match entity {
        "nbsp" => Some(" "),
        _ => None,
    })
    .unwrap_or(Cow::Borrowed(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let text = html_to_text("<h2 id=\"a\">Tom &amp; Jerry</h2><p>are<br>friends</p>");
        assert_eq!(text, "Tom & Jerry are friends");
    }

    #[test]
    fn decodes_numeric_entities() {
        let text = html_to_text("<p>It&#8217;s &#x2014; fine&nbsp;now</p>");
        assert_eq!(text, "It\u{2019}s \u{2014} fine now");
    }

    #[test]
    fn attribute_values_never_leak_into_text() {
        let text = html_to_text(r#"<p><a href="/x" title="a > b">link</a> and <img alt="x > y" src="/i.png"></p>"#);
        assert_eq!(text, "link and");
    }

    #[test]
    fn inline_elements_keep_words_together() {
        let text = html_to_text("<p>re<strong>use</strong> it</p><p>next</p>plain");
        assert_eq!(text, "reuse it next plain");
    }

    #[test]
    fn truncation_respects_limit_and_char_boundaries() {
        let long = "é".repeat(100);
        let cut = truncate_with_ellipsis(&long, 80);
        assert_eq!(cut.chars().count(), 80);
        assert!(cut.ends_with("..."));

        assert_eq!(truncate_with_ellipsis("short", 80), "short");
    }

    #[test]
    fn truncation_trims_before_ellipsis() {
        let cut = truncate_with_ellipsis("aaaa bbbb", 8);
        assert_eq!(cut, "aaaa...");
    }
}
