use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use comrak::options::{ListStyleType, Options};

pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options);
    options
}

/// Allow-list for author HTML. Highlighted code relies on `class`, headings
/// get their ids after sanitisation.
pub(crate) fn build_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "aside",
        "blockquote",
        "br",
        "code",
        "dd",
        "del",
        "details",
        "div",
        "dl",
        "dt",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "input",
        "ins",
        "kbd",
        "li",
        "mark",
        "ol",
        "p",
        "pre",
        "s",
        "section",
        "span",
        "strong",
        "sub",
        "summary",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from([
        "class",
        "id",
        "title",
        "lang",
        "dir",
        "aria-hidden",
        "aria-label",
        "role",
        "data-footnote-ref",
        "data-footnotes",
        "data-footnote-backref",
        "data-footnote-backref-idx",
    ]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("a", &["target"]);
    builder.add_tag_attributes(
        "img",
        &["title", "width", "height", "alt", "loading", "decoding"],
    );
    builder.add_tag_attributes("code", &["data-meta", "data-language", "class"]);
    builder.add_tag_attributes("pre", &["class", "data-language"]);
    builder.add_tag_attributes("details", &["open"]);
    builder.add_tag_attributes("th", &["align", "colspan", "rowspan", "scope"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled", "class"]);

    builder.add_url_schemes(["http", "https", "mailto", "tel"].iter().copied());
    // External links receive rel/target during post-processing.
    builder.link_rel(None);

    builder
}

fn configure_extensions(options: &mut Options<'static>) {
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.superscript = true;
    ext.footnotes = true;
    ext.description_lists = true;
    ext.alerts = true;
    ext.underline = true;

    let render = &mut options.render;
    render.github_pre_lang = true;
    render.full_info_string = true;
    render.tasklist_classes = true;
    render.list_style = ListStyleType::Dash;
    render.r#unsafe = true;
    render.figure_with_caption = true;
    render.sourcepos = false;
    render.gfm_quirks = true;
}

#[cfg(test)]
mod tests {
    use super::build_sanitizer;

    #[test]
    fn sanitizer_strips_scripts() {
        let html = build_sanitizer()
            .clean("<p>hi</p><script>alert(1)</script>")
            .to_string();
        assert_eq!(html, "<p>hi</p>");
    }

    #[test]
    fn sanitizer_preserves_highlight_classes() {
        let html = build_sanitizer()
            .clean("<pre class=\"syntax-highlight\"><code class=\"language-rust\"><span class=\"syntax-keyword\">fn</span></code></pre>")
            .to_string();
        assert!(html.contains("class=\"syntax-keyword\""));
        assert!(html.contains("class=\"syntax-highlight\""));
    }

    #[test]
    fn sanitizer_keeps_details_blocks() {
        let html = build_sanitizer()
            .clean("<details open><summary>More</summary><p>Body</p></details>")
            .to_string();
        assert!(html.contains("<summary>More</summary>"));
    }
}
