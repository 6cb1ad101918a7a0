use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    application::{index::ContentIndex, text},
    domain::types::ContentKind,
};

pub const EXCERPT_MAX_CHARS: usize = 200;
const DESCRIPTION_MAX_CHARS: usize = 160;
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// One searchable item as published in `search-data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub kind: ContentKind,
    pub slug: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: String,
    /// `YYYY-MM-DD`; absent for undated kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub excerpt: String,
}

/// The four arrays the scorer works over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    #[serde(default)]
    pub blog_posts: Vec<SearchDocument>,
    #[serde(default)]
    pub silly_questions: Vec<SearchDocument>,
    #[serde(default)]
    pub til: Vec<SearchDocument>,
    #[serde(default)]
    pub technical_terms: Vec<SearchDocument>,
}

impl SearchData {
    pub fn documents(&self) -> impl Iterator<Item = &SearchDocument> {
        self.blog_posts
            .iter()
            .chain(self.silly_questions.iter())
            .chain(self.til.iter())
            .chain(self.technical_terms.iter())
    }

    pub fn len(&self) -> usize {
        self.blog_posts.len()
            + self.silly_questions.len()
            + self.til.len()
            + self.technical_terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn build_search_data(index: &ContentIndex) -> SearchData {
    let blog_posts = index
        .posts()
        .iter()
        .map(|post| SearchDocument {
            kind: ContentKind::Blog,
            slug: post.slug.clone(),
            url: ContentKind::Blog.path_for(&post.slug),
            title: post.title.clone(),
            description: post.description.clone(),
            tags: post.tags.clone(),
            category: post.category.clone(),
            date: format_date(post.date),
            excerpt: text::excerpt(&post.content, EXCERPT_MAX_CHARS),
        })
        .collect();

    let silly_questions = index
        .questions()
        .iter()
        .map(|question| SearchDocument {
            kind: ContentKind::SillyQuestion,
            slug: question.slug.clone(),
            url: ContentKind::SillyQuestion.path_for(&question.slug),
            title: question.question.clone(),
            description: text::excerpt(&question.answer, DESCRIPTION_MAX_CHARS),
            tags: question.tags.clone(),
            category: question.category.clone(),
            date: format_date(question.date),
            excerpt: text::excerpt(&question.answer, EXCERPT_MAX_CHARS),
        })
        .collect();

    let til = index
        .til()
        .iter()
        .map(|entry| SearchDocument {
            kind: ContentKind::Til,
            slug: entry.slug.clone(),
            url: ContentKind::Til.path_for(&entry.slug),
            title: entry.title.clone(),
            description: text::excerpt(&entry.content, DESCRIPTION_MAX_CHARS),
            tags: entry.tags.clone(),
            category: entry.category.clone(),
            date: format_date(entry.date),
            excerpt: text::excerpt(&entry.content, EXCERPT_MAX_CHARS),
        })
        .collect();

    let technical_terms = index
        .terms()
        .iter()
        .map(|term| SearchDocument {
            kind: ContentKind::TechnicalTerm,
            slug: term.slug.clone(),
            url: ContentKind::TechnicalTerm.path_for(&term.slug),
            title: term.title.clone(),
            description: term.description.clone(),
            tags: term.aliases.clone(),
            category: ContentKind::TechnicalTerm.label().to_string(),
            date: None,
            excerpt: text::excerpt(&term.content, EXCERPT_MAX_CHARS),
        })
        .collect();

    SearchData {
        blog_posts,
        silly_questions,
        til,
        technical_terms,
    }
}

fn format_date(date: Date) -> Option<String> {
    date.format(DATE_FORMAT).ok()
}
