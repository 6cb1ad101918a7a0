use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::index::{SearchData, SearchDocument};

pub const DEFAULT_MAX_RESULTS: usize = 20;

const EXACT_SCORE: f64 = 100.0;
const PREFIX_SCORE: f64 = 75.0;
const SUBSTRING_SCORE: f64 = 50.0;
const PARTIAL_SCORE: f64 = 25.0;

const TITLE_WEIGHT: f64 = 3.0;
const TAGS_WEIGHT: f64 = 2.0;
const CATEGORY_WEIGHT: f64 = 1.5;
const DESCRIPTION_WEIGHT: f64 = 1.0;
const EXCERPT_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub document: SearchDocument,
    pub score: f64,
}

/// Lowercase, trim and collapse internal whitespace.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rank every document against `query` and keep the best `limit`.
///
/// Pure and deterministic: equal scores are ordered by date (newest first,
/// undated last) and then by title.
pub fn search(data: &SearchData, query: &str, limit: usize) -> Vec<SearchResult> {
    let normalized = normalize_query(query);
    if normalized.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &SearchDocument)> = data
        .documents()
        .filter_map(|document| {
            let score = score_document(document, &normalized);
            (score > 0.0).then_some((score, document))
        })
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        b_score
            .total_cmp(a_score)
            .then_with(|| compare_dates(a.date.as_deref(), b.date.as_deref()))
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            .then_with(|| a.title.cmp(&b.title))
    });

    scored
        .into_iter()
        .take(limit)
        .map(|(score, document)| SearchResult {
            document: document.clone(),
            score,
        })
        .collect()
}

/// Weighted sum of per-field match scores. `query` must already be normalised.
pub fn score_document(document: &SearchDocument, query: &str) -> f64 {
    let words: Vec<&str> = query.split(' ').filter(|word| !word.is_empty()).collect();
    if words.is_empty() {
        return 0.0;
    }

    let tags = document
        .tags
        .iter()
        .map(|tag| field_score(tag, query, &words))
        .fold(0.0_f64, f64::max);

    field_score(&document.title, query, &words) * TITLE_WEIGHT
        + tags * TAGS_WEIGHT
        + field_score(&document.category, query, &words) * CATEGORY_WEIGHT
        + field_score(&document.description, query, &words) * DESCRIPTION_WEIGHT
        + field_score(&document.excerpt, query, &words) * EXCERPT_WEIGHT
}

fn field_score(field: &str, query: &str, words: &[&str]) -> f64 {
    let field = normalize_query(field);
    if field.is_empty() {
        return 0.0;
    }
    if field == query {
        return EXACT_SCORE;
    }
    if field.starts_with(query) {
        return PREFIX_SCORE;
    }
    if field.contains(query) {
        return SUBSTRING_SCORE;
    }

    let field_words: Vec<&str> = field.split(' ').collect();
    let matched = words
        .iter()
        .filter(|word| field_words.iter().any(|candidate| candidate.contains(*word)))
        .count();
    if matched == 0 {
        return 0.0;
    }
    PARTIAL_SCORE * matched as f64 / words.len() as f64
}

// Dates are `YYYY-MM-DD`, so string order is chronological order.
fn compare_dates(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
