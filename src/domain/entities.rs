//! Content records assembled from files under the content root.
//!
//! Everything here is immutable once loaded, with the exception of
//! [`StatsRecord`], which mirrors a row owned by the hosted stats table.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::types::ContentKind;

/// Question/answer pair rendered as an FAQ block and as `FAQPage` JSON-LD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// One heading captured for a table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub level: u8,
    pub anchor: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: Date,
    pub updated: Option<Date>,
    pub author: String,
    pub tags: Vec<String>,
    pub category: String,
    pub series: Option<String>,
    /// Rendered, sanitised HTML.
    pub content: String,
    pub reading_time_minutes: u32,
    pub word_count: u32,
    pub toc: Vec<TocEntry>,
    pub faqs: Vec<FaqEntry>,
}

impl BlogPost {
    pub fn last_modified(&self) -> Date {
        self.updated.unwrap_or(self.date).max(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SillyQuestion {
    pub slug: String,
    pub question: String,
    /// Rendered answer HTML.
    pub answer: String,
    pub date: Date,
    pub tags: Vec<String>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilEntry {
    pub slug: String,
    pub title: String,
    pub date: Date,
    pub category: String,
    pub tags: Vec<String>,
    pub content: String,
    /// Markdown body as written, without frontmatter.
    pub raw_markdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicalTerm {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub aliases: Vec<String>,
    pub related: Vec<String>,
    pub toc: Vec<TocEntry>,
    pub faqs: Vec<FaqEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheatsheetSection {
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub language: Option<String>,
    /// Highlighted HTML, filled in by the loader.
    #[serde(skip)]
    pub code_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cheatsheet {
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<CheatsheetSection>,
}

/// Curated landing page gathering everything tagged with any of `tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Ordered reading list of blog posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub posts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsesItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsesGroup {
    pub title: String,
    #[serde(default)]
    pub items: Vec<UsesItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Row of the hosted stats table. The service owns this state; the site only
/// reads it and asks for atomic increments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub slug: String,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub reports: i64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl StatsRecord {
    pub fn empty(kind: ContentKind, slug: impl Into<String>) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            slug: slug.into(),
            views: 0,
            upvotes: 0,
            reports: 0,
            updated_at: None,
        }
    }
}
