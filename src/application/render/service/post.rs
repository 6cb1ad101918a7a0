use std::{cell::RefCell, rc::Rc};

use lol_html::{RewriteStrSettings, element, rewrite_str, text};

use crate::application::render::types::{ContentMetrics, RenderError};

use super::rewrite::HeadingInfo;

const WORDS_PER_MINUTE: f32 = 200.0;

pub(crate) struct ProcessedHtml {
    pub(crate) html: String,
    pub(crate) metrics: ContentMetrics,
}

pub(crate) fn post_process(
    sanitized_html: &str,
    headings: &[HeadingInfo],
) -> Result<ProcessedHtml, RenderError> {
    let html = if headings.is_empty() {
        sanitized_html.to_string()
    } else {
        apply_heading_ids(sanitized_html, headings)?
    };
    let augmentation = augment_semantics(&html)?;

    Ok(ProcessedHtml {
        html: augmentation.html,
        metrics: ContentMetrics {
            word_count: augmentation.word_count,
            reading_time_minutes: reading_time_minutes(augmentation.word_count),
        },
    })
}

struct AugmentOutcome {
    html: String,
    word_count: u32,
}

fn augment_semantics(html: &str) -> Result<AugmentOutcome, RenderError> {
    let word_count = Rc::new(RefCell::new(0u32));

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("img", |el| {
                    if el.get_attribute("alt").is_none() {
                        el.set_attribute("alt", "")?;
                    }
                    if el.get_attribute("loading").is_none() {
                        el.set_attribute("loading", "lazy")?;
                    }
                    if el.get_attribute("decoding").is_none() {
                        el.set_attribute("decoding", "async")?;
                    }
                    Ok(())
                }),
                element!("a[href]", |el| {
                    if el.get_attribute("href").is_some_and(|href| is_external(&href)) {
                        let rel_value =
                            merge_rel(el.get_attribute("rel"), &["noopener", "noreferrer"]);
                        el.set_attribute("rel", &rel_value)?;
                        el.set_attribute("target", "_blank")?;
                    }
                    Ok(())
                }),
                element!("pre[data-language]", |el| {
                    if let Some(lang) = el.get_attribute("data-language")
                        && el.get_attribute("aria-label").is_none()
                    {
                        let trimmed = lang.trim();
                        if !trimmed.is_empty() {
                            el.set_attribute("aria-label", &format!("Code block in {trimmed}"))?;
                        }
                    }
                    Ok(())
                }),
                element!("table", |el| {
                    el.set_attribute("data-role", "content-table")?;
                    Ok(())
                }),
                text!("*", {
                    let word_count = Rc::clone(&word_count);
                    move |t| {
                        let words = t.as_str().split_whitespace().count() as u32;
                        if words > 0 {
                            let mut count = word_count.borrow_mut();
                            *count = count.saturating_add(words);
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })?;

    let word_count = *word_count.borrow();
    Ok(AugmentOutcome {
        html: rewritten,
        word_count,
    })
}

/// `ceil(words / 200)`, at least one minute for any non-empty body.
pub(crate) fn reading_time_minutes(word_count: u32) -> u32 {
    if word_count == 0 {
        return 0;
    }
    ((word_count as f32 / WORDS_PER_MINUTE).ceil() as u32).max(1)
}

fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

fn merge_rel(existing: Option<String>, required: &[&str]) -> String {
    let mut tokens: Vec<String> = existing
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    for &token in required {
        if !tokens.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            tokens.push(token.to_string());
        }
    }
    tokens.join(" ")
}

/// Stamp `id` attributes onto headings in document order. Headings the
/// sanitizer dropped are skipped rather than treated as an error.
fn apply_heading_ids(html: &str, headings: &[HeadingInfo]) -> Result<String, RenderError> {
    let headings_shared = Rc::new(headings.to_vec());
    let index = Rc::new(RefCell::new(0usize));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("h1, h2, h3, h4, h5, h6", {
                let headings_shared = Rc::clone(&headings_shared);
                let index = Rc::clone(&index);
                move |el| {
                    let mut idx = index.borrow_mut();
                    let level = el
                        .tag_name()
                        .strip_prefix('h')
                        .and_then(|value| value.parse::<u8>().ok())
                        .unwrap_or(0);
                    let Some(info) = headings_shared.get(*idx) else {
                        return Ok(());
                    };
                    if info.level != level {
                        return Ok(());
                    }
                    *idx += 1;
                    el.set_attribute("id", &info.slug)?;
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })
}
