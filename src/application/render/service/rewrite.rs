use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use syntect::html::ClassStyle;
use syntect::parsing::SyntaxSet;
use tracing::warn;

use crate::{application::render::types::RenderError, domain::slug::AnchorSlugger};

use super::highlight;

#[derive(Debug, Clone)]
pub(crate) struct HeadingInfo {
    pub(crate) level: u8,
    pub(crate) slug: String,
    pub(crate) text: String,
}

#[derive(Default)]
pub(crate) struct RewriteOutcome {
    pub(crate) headings: Vec<HeadingInfo>,
}

/// Walk the AST once: assign heading anchors and swap fenced code for
/// highlighted HTML blocks.
pub(crate) fn rewrite_ast<'a>(
    root: &'a AstNode<'a>,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
    slug: &str,
) -> Result<RewriteOutcome, RenderError> {
    let mut walker = RewriteWalker::new(syntax_set, class_style, slug);
    walker.visit_nodes(root)?;
    Ok(walker.outcome)
}

struct RewriteWalker<'a> {
    syntax_set: &'a SyntaxSet,
    class_style: &'a ClassStyle,
    outcome: RewriteOutcome,
    slugger: AnchorSlugger,
    slug: &'a str,
}

impl<'a> RewriteWalker<'a> {
    fn new(syntax_set: &'a SyntaxSet, class_style: &'a ClassStyle, slug: &'a str) -> Self {
        Self {
            syntax_set,
            class_style,
            outcome: RewriteOutcome::default(),
            slugger: AnchorSlugger::new(),
            slug,
        }
    }

    fn visit_nodes(&mut self, node: &AstNode<'_>) -> Result<(), RenderError> {
        if let Some(level) = heading_level(node) {
            let text = collect_inline_text(node);
            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let slug = match self.slugger.anchor_for(&normalized) {
                Ok(slug) => slug,
                // Headings made only of punctuation or emoji still need an anchor.
                Err(_) => self
                    .slugger
                    .anchor_for("section")
                    .map_err(|err| RenderError::Anchoring {
                        message: err.to_string(),
                    })?,
            };
            self.outcome.headings.push(HeadingInfo {
                level,
                slug,
                text: normalized,
            });
        }

        if let Some((info, literal)) = extract_code_block(node) {
            let mut segments = info.split_whitespace();
            let language = segments.next().map(|s| s.to_string());
            let meta = segments.collect::<Vec<_>>().join(" ");
            let meta_ref = (!meta.is_empty()).then_some(meta.as_str());

            let html = match highlight::highlight_code(
                language.as_deref(),
                meta_ref,
                &literal,
                self.syntax_set,
                self.class_style,
            ) {
                Ok(html) => html,
                Err(err) => {
                    warn!(
                        target = "application::render::highlight",
                        slug = self.slug,
                        error = %err,
                        "syntax highlighting failed; using plain code block"
                    );
                    build_plain_code_block(language.as_deref().unwrap_or("text"), &literal)
                }
            };

            let mut data = node.data.borrow_mut();
            data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: 0,
                literal: html,
            });
        }

        let mut child = node.first_child();
        while let Some(next) = child {
            self.visit_nodes(next)?;
            child = next.next_sibling();
        }

        Ok(())
    }
}

fn build_plain_code_block(language: &str, literal: &str) -> String {
    let escaped_code = ammonia::clean_text(literal);
    let mut html = String::from("<pre class=\"syntax-highlight\"");
    if !language.is_empty() {
        html.push_str(" data-language=\"");
        html.push_str(&ammonia::clean_text(language));
        html.push('"');
    }
    html.push_str("><code>");
    html.push_str(&escaped_code);
    if !escaped_code.ends_with('\n') {
        html.push('\n');
    }
    html.push_str("</code></pre>");
    html
}

fn collect_inline_text(node: &AstNode<'_>) -> String {
    fn walk(node: &AstNode<'_>, buffer: &mut String) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                _ => {}
            }
        }
        let mut child = node.first_child();
        while let Some(next) = child {
            walk(next, buffer);
            child = next.next_sibling();
        }
    }

    let mut text = String::new();
    let mut child = node.first_child();
    while let Some(next) = child {
        walk(next, &mut text);
        child = next.next_sibling();
    }
    text
}

fn extract_code_block(node: &AstNode<'_>) -> Option<(String, String)> {
    let data = node.data.borrow();
    if let NodeValue::CodeBlock(block) = &data.value {
        Some((block.info.trim().to_string(), block.literal.clone()))
    } else {
        None
    }
}

fn heading_level(node: &AstNode<'_>) -> Option<u8> {
    let data = node.data.borrow();
    if let NodeValue::Heading(heading) = &data.value {
        Some(heading.level)
    } else {
        None
    }
}
