mod config;
mod highlight;
mod post;
mod rewrite;

use std::sync::Arc;

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use once_cell::sync::Lazy;
use syntect::{
    highlighting::ThemeSet,
    html::{ClassStyle, css_for_theme_with_class_style},
    parsing::SyntaxSet,
};

use crate::application::render::types::{
    RenderError, RenderOutput, RenderRequest, RenderService, RenderTarget,
};
use crate::domain::entities::TocEntry;

use config::{build_sanitizer, default_options};
use post::{ProcessedHtml, post_process};
use rewrite::{HeadingInfo, rewrite_ast};

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "syntax-" };

/// Comrak-based rendering pipeline with Syntect highlighting and Ammonia sanitisation.
pub struct ComrakRenderService {
    options: comrak::Options<'static>,
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
    sanitizer: ammonia::Builder<'static>,
}

impl ComrakRenderService {
    /// Construct a renderer with GFM extensions enabled and syntax
    /// highlighting configured to emit `syntax-` prefixed CSS classes.
    pub fn new() -> Self {
        Self {
            options: default_options(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
            class_style: CLASS_STYLE,
            sanitizer: build_sanitizer(),
        }
    }
}

impl Default for ComrakRenderService {
    fn default() -> Self {
        Self::new()
    }
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> =
    Lazy::new(|| Arc::new(ComrakRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

/// Stylesheet for the `syntax-` classes emitted by the highlighter.
pub fn syntax_theme_css(theme: &str) -> Result<String, RenderError> {
    let themes = ThemeSet::load_defaults();
    let selected = themes
        .themes
        .get(theme)
        .ok_or_else(|| RenderError::Highlighting {
            language: "css".to_string(),
            message: format!("unknown syntax theme `{theme}`"),
        })?;
    css_for_theme_with_class_style(selected, CLASS_STYLE).map_err(|err| {
        RenderError::Highlighting {
            language: "css".to_string(),
            message: err.to_string(),
        }
    })
}

impl RenderService for ComrakRenderService {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, &request.markdown, &self.options);

        let rewrite_outcome = rewrite_ast(
            root,
            &self.syntax_set,
            &self.class_style,
            request.target.slug(),
        )?;

        let rendered_html = render_html_stage(root, &self.options)?;
        let sanitized_html = self.sanitizer.clean(&rendered_html).to_string();

        let ProcessedHtml { html, metrics } =
            post_process(&sanitized_html, &rewrite_outcome.headings)?;

        let toc = match request.target {
            RenderTarget::Article { .. } => build_toc(&rewrite_outcome.headings),
            RenderTarget::Note { .. } => Vec::new(),
        };

        Ok(RenderOutput {
            html,
            toc,
            metrics,
        })
    }

    fn highlight(&self, language: Option<&str>, code: &str) -> Result<String, RenderError> {
        highlight::highlight_code(language, None, code, &self.syntax_set, &self.class_style)
    }
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}

fn build_toc(headings: &[HeadingInfo]) -> Vec<TocEntry> {
    headings
        .iter()
        .filter(|heading| (2..=3).contains(&heading.level))
        .map(|heading| TocEntry {
            level: heading.level,
            anchor: heading.slug.clone(),
            text: heading.text.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(target: RenderTarget, markdown: &str) -> RenderOutput {
        render_service()
            .render(&RenderRequest::new(target, markdown))
            .expect("render")
    }

    #[test]
    fn article_gets_toc_for_levels_two_and_three() {
        let output = render(
            RenderTarget::article("post"),
            "# Title\n\n## Overview\n\nBody text.\n\n### Details\n\n#### Deep\n\n## Overview\n",
        );
        let anchors: Vec<_> = output.toc.iter().map(|e| e.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["overview", "details", "overview-2"]);
        assert!(output.html.contains(r#"<h2 id="overview">"#));
        assert!(output.html.contains(r#"<h4 id="deep">"#));
    }

    #[test]
    fn notes_have_no_toc() {
        let output = render(RenderTarget::note("til"), "## Heading\n\nShort note.");
        assert!(output.toc.is_empty());
        assert!(output.html.contains(r#"id="heading""#));
    }

    #[test]
    fn raw_scripts_are_removed() {
        let output = render(
            RenderTarget::note("q"),
            "Hello <script>alert(1)</script> world",
        );
        assert!(!output.html.contains("<script"));
        assert!(output.html.contains("Hello"));
    }

    #[test]
    fn code_blocks_are_highlighted() {
        let output = render(
            RenderTarget::article("code"),
            "Intro\n\n```rust\nfn main() {}\n```\n",
        );
        assert!(output.html.contains("syntax-lang-rust"));
        assert!(output.html.contains(r#"aria-label="Code block in rust""#));
    }

    #[test]
    fn empty_markdown_has_zero_reading_time() {
        let output = render(RenderTarget::note("empty"), "");
        assert_eq!(output.metrics.word_count, 0);
        assert_eq!(output.metrics.reading_time_minutes, 0);
    }

    #[test]
    fn internal_links_keep_default_behaviour() {
        let output = render(
            RenderTarget::note("links"),
            "[home](/) and [docs](https://docs.rs)",
        );
        assert!(output.html.contains(r#"<a href="/">home</a>"#));
        assert!(output.html.contains(r#"target="_blank""#));
    }

    #[test]
    fn highlight_snippet_for_cheatsheets() {
        let html = render_service()
            .highlight(Some("bash"), "echo hi")
            .expect("highlight");
        assert!(html.starts_with("<pre class=\"syntax-highlight syntax-lang-bash\""));
    }

    #[test]
    fn theme_css_uses_prefixed_classes() {
        let css = syntax_theme_css("InspiredGitHub").expect("css");
        assert!(css.contains(".syntax-"));
        assert!(syntax_theme_css("does-not-exist").is_err());
    }
}
