//! Immutable, sorted view over everything the loader produced.

use std::collections::BTreeMap;

use time::Date;
use tracing::{debug, warn};

use crate::domain::{
    entities::{
        BlogPost, Cheatsheet, GlossaryEntry, Series, SillyQuestion, TechnicalTerm, TilEntry, Topic,
        UsesGroup,
    },
    slug::derive_slug,
    types::ContentKind,
};

const RELATED_POSTS_LIMIT: usize = 3;

/// Unsorted content as assembled by the loader.
#[derive(Debug, Clone, Default)]
pub struct ContentSet {
    pub posts: Vec<BlogPost>,
    pub questions: Vec<SillyQuestion>,
    pub til: Vec<TilEntry>,
    pub terms: Vec<TechnicalTerm>,
    pub cheatsheets: Vec<Cheatsheet>,
    pub topics: Vec<Topic>,
    pub series: Vec<Series>,
    pub uses: Vec<UsesGroup>,
    pub glossary: Vec<GlossaryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSummary {
    pub slug: String,
    pub name: String,
    pub count: usize,
}

/// Items sharing a tag (or one of a topic's tags).
#[derive(Debug, Default)]
pub struct TaggedContent<'a> {
    pub posts: Vec<&'a BlogPost>,
    pub questions: Vec<&'a SillyQuestion>,
    pub til: Vec<&'a TilEntry>,
}

impl TaggedContent<'_> {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.questions.is_empty() && self.til.is_empty()
    }

    pub fn len(&self) -> usize {
        self.posts.len() + self.questions.len() + self.til.len()
    }
}

/// A dated piece of content with its public path, used for sitemaps,
/// feeds and "recently changed" notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedPath {
    pub kind: ContentKind,
    pub slug: String,
    pub path: String,
    pub lastmod: Option<Date>,
}

#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    posts: Vec<BlogPost>,
    questions: Vec<SillyQuestion>,
    til: Vec<TilEntry>,
    terms: Vec<TechnicalTerm>,
    cheatsheets: Vec<Cheatsheet>,
    topics: Vec<Topic>,
    series: Vec<Series>,
    uses: Vec<UsesGroup>,
    glossary: Vec<GlossaryEntry>,
}

impl ContentIndex {
    pub fn new(set: ContentSet) -> Self {
        let ContentSet {
            mut posts,
            mut questions,
            mut til,
            mut terms,
            mut cheatsheets,
            topics,
            series,
            uses,
            glossary,
        } = set;

        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        questions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        til.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        terms.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.slug.cmp(&b.slug))
        });
        cheatsheets.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.slug.cmp(&b.slug))
        });

        let series = series
            .into_iter()
            .map(|mut entry| {
                entry.posts.retain(|slug| {
                    let known = posts.iter().any(|post| &post.slug == slug);
                    if !known {
                        warn!(
                            target = "application::index",
                            series = %entry.slug,
                            post = %slug,
                            "series references unknown post; skipping"
                        );
                    }
                    known
                });
                entry
            })
            .collect();

        Self {
            posts,
            questions,
            til,
            terms,
            cheatsheets,
            topics,
            series,
            uses,
            glossary,
        }
    }

    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn post(&self, slug: &str) -> Option<&BlogPost> {
        self.posts.iter().find(|post| post.slug == slug)
    }

    pub fn questions(&self) -> &[SillyQuestion] {
        &self.questions
    }

    pub fn question(&self, slug: &str) -> Option<&SillyQuestion> {
        self.questions.iter().find(|question| question.slug == slug)
    }

    pub fn til(&self) -> &[TilEntry] {
        &self.til
    }

    pub fn til_entry(&self, slug: &str) -> Option<&TilEntry> {
        self.til.iter().find(|entry| entry.slug == slug)
    }

    pub fn terms(&self) -> &[TechnicalTerm] {
        &self.terms
    }

    pub fn term(&self, slug: &str) -> Option<&TechnicalTerm> {
        self.terms.iter().find(|term| term.slug == slug)
    }

    pub fn cheatsheets(&self) -> &[Cheatsheet] {
        &self.cheatsheets
    }

    pub fn cheatsheet(&self, slug: &str) -> Option<&Cheatsheet> {
        self.cheatsheets.iter().find(|sheet| sheet.slug == slug)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn uses(&self) -> &[UsesGroup] {
        &self.uses
    }

    pub fn glossary(&self) -> &[GlossaryEntry] {
        &self.glossary
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
            && self.questions.is_empty()
            && self.til.is_empty()
            && self.terms.is_empty()
            && self.cheatsheets.is_empty()
    }

    /// Whether `slug` exists for the given kind.
    pub fn contains(&self, kind: ContentKind, slug: &str) -> bool {
        match kind {
            ContentKind::Blog => self.post(slug).is_some(),
            ContentKind::SillyQuestion => self.question(slug).is_some(),
            ContentKind::Til => self.til_entry(slug).is_some(),
            ContentKind::TechnicalTerm => self.term(slug).is_some(),
            ContentKind::Cheatsheet => self.cheatsheet(slug).is_some(),
        }
    }

    /// Posts of a series in reading order.
    pub fn series_posts(&self, series: &Series) -> Vec<&BlogPost> {
        series
            .posts
            .iter()
            .filter_map(|slug| self.post(slug))
            .collect()
    }

    /// The series a post belongs to, either declared in its frontmatter or
    /// listed in `series.json`.
    pub fn series_for_post(&self, post: &BlogPost) -> Option<&Series> {
        self.series.iter().find(|series| {
            post.series.as_deref() == Some(series.slug.as_str())
                || series.posts.iter().any(|slug| slug == &post.slug)
        })
    }

    /// Up to three other posts ranked by shared tags, newer first on ties.
    pub fn related_posts(&self, post: &BlogPost) -> Vec<&BlogPost> {
        let mut scored: Vec<(usize, &BlogPost)> = self
            .posts
            .iter()
            .filter(|candidate| candidate.slug != post.slug)
            .filter_map(|candidate| {
                let shared = candidate
                    .tags
                    .iter()
                    .filter(|tag| post.tags.iter().any(|own| own.eq_ignore_ascii_case(tag)))
                    .count();
                (shared > 0).then_some((shared, candidate))
            })
            .collect();

        scored.sort_by(|(a_shared, a), (b_shared, b)| {
            b_shared
                .cmp(a_shared)
                .then_with(|| b.date.cmp(&a.date))
                .then_with(|| a.slug.cmp(&b.slug))
        });
        scored
            .into_iter()
            .take(RELATED_POSTS_LIMIT)
            .map(|(_, post)| post)
            .collect()
    }

    /// Every tag used by posts, questions and TIL entries, keyed by tag slug.
    pub fn tags(&self) -> Vec<TagSummary> {
        let mut tags: BTreeMap<String, TagSummary> = BTreeMap::new();
        let all = self
            .posts
            .iter()
            .flat_map(|post| post.tags.iter())
            .chain(self.questions.iter().flat_map(|q| q.tags.iter()))
            .chain(self.til.iter().flat_map(|entry| entry.tags.iter()));

        for tag in all {
            let Some(slug) = tag_slug(tag) else {
                debug!(target = "application::index", tag = %tag, "tag has no slug; no tag page");
                continue;
            };
            tags.entry(slug.clone())
                .and_modify(|summary| summary.count += 1)
                .or_insert_with(|| TagSummary {
                    slug,
                    name: tag.clone(),
                    count: 1,
                });
        }
        tags.into_values().collect()
    }

    /// Content carrying the tag whose slug is `slug`.
    pub fn tagged(&self, slug: &str) -> TaggedContent<'_> {
        self.matching(|tags| tags.iter().any(|tag| tag_slug(tag).as_deref() == Some(slug)))
    }

    /// Content carrying any of the topic's tags.
    pub fn topic_content(&self, topic: &Topic) -> TaggedContent<'_> {
        let wanted: Vec<String> = topic.tags.iter().filter_map(|tag| tag_slug(tag)).collect();
        self.matching(|tags| {
            tags.iter()
                .filter_map(|tag| tag_slug(tag))
                .any(|slug| wanted.contains(&slug))
        })
    }

    fn matching<F>(&self, predicate: F) -> TaggedContent<'_>
    where
        F: Fn(&[String]) -> bool,
    {
        TaggedContent {
            posts: self.posts.iter().filter(|p| predicate(&p.tags)).collect(),
            questions: self
                .questions
                .iter()
                .filter(|q| predicate(&q.tags))
                .collect(),
            til: self.til.iter().filter(|t| predicate(&t.tags)).collect(),
        }
    }

    /// Detail pages of every kind with their last-modified date.
    pub fn detail_paths(&self) -> Vec<DatedPath> {
        let mut paths = Vec::new();
        for post in &self.posts {
            paths.push(dated(ContentKind::Blog, &post.slug, Some(post.last_modified())));
        }
        for question in &self.questions {
            paths.push(dated(
                ContentKind::SillyQuestion,
                &question.slug,
                Some(question.date),
            ));
        }
        for entry in &self.til {
            paths.push(dated(ContentKind::Til, &entry.slug, Some(entry.date)));
        }
        for term in &self.terms {
            paths.push(dated(ContentKind::TechnicalTerm, &term.slug, None));
        }
        for sheet in &self.cheatsheets {
            paths.push(dated(ContentKind::Cheatsheet, &sheet.slug, None));
        }
        paths
    }

    /// Newest content date across dated kinds.
    pub fn latest_date(&self) -> Option<Date> {
        self.detail_paths()
            .into_iter()
            .filter_map(|path| path.lastmod)
            .max()
    }
}

fn dated(kind: ContentKind, slug: &str, lastmod: Option<Date>) -> DatedPath {
    DatedPath {
        kind,
        slug: slug.to_string(),
        path: kind.path_for(slug),
        lastmod,
    }
}

/// URL segment for a tag, `None` when nothing in it survives slugification.
pub fn tag_slug(tag: &str) -> Option<String> {
    derive_slug(tag).ok()
}
