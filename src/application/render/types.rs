use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::TocEntry;

/// Identifies what is being rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderTarget {
    /// Long-form body that gets a table of contents (posts, glossary terms).
    Article { slug: String },
    /// Short body without a table of contents (answers, TIL notes, FAQ answers).
    Note { slug: String },
}

impl RenderTarget {
    pub fn slug(&self) -> &str {
        match self {
            RenderTarget::Article { slug } | RenderTarget::Note { slug } => slug.as_str(),
        }
    }

    pub fn article(slug: impl Into<String>) -> Self {
        RenderTarget::Article { slug: slug.into() }
    }

    pub fn note(slug: impl Into<String>) -> Self {
        RenderTarget::Note { slug: slug.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub target: RenderTarget,
    pub markdown: String,
}

impl RenderRequest {
    pub fn new(target: RenderTarget, markdown: impl Into<String>) -> Self {
        Self {
            target,
            markdown: markdown.into(),
        }
    }
}

/// Content-level metrics surfaced alongside rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContentMetrics {
    pub word_count: u32,
    pub reading_time_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Sanitised HTML ready to embed in a page.
    pub html: String,
    /// Level 2 and 3 headings, present only for [`RenderTarget::Article`].
    pub toc: Vec<TocEntry>,
    #[serde(default)]
    pub metrics: ContentMetrics,
}

/// Structured errors surfaced by the rendering pipeline.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown parsing failed: {message}")]
    Markdown { message: String },
    #[error("syntax highlighting failed: {language}: {message}")]
    Highlighting { language: String, message: String },
    #[error("document processing failed: {message}")]
    Document { message: String },
    #[error("anchor slug generation failed: {message}")]
    Anchoring { message: String },
}

/// Implementations must be deterministic: the same request yields the same
/// output or the same error.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError>;

    /// Highlight a standalone snippet (cheatsheet sections).
    fn highlight(&self, language: Option<&str>, code: &str) -> Result<String, RenderError>;
}
