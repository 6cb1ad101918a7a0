//! YAML frontmatter parsing for Markdown content files.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use time::{
    Date, OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use super::entities::FaqEntry;
use super::error::DomainError;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Frontmatter of a blog post.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogFrontmatter {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, alias = "faq", alias = "questions")]
    pub faqs: Vec<FaqEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionFrontmatter {
    pub question: String,
    pub date: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TilFrontmatter {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermFrontmatter {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub related: Vec<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, alias = "faq", alias = "questions")]
    pub faqs: Vec<FaqEntry>,
}

/// A content file split into its frontmatter block and Markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub yaml: &'a str,
    pub body: &'a str,
}

/// Split a leading `---` YAML block from the Markdown body.
pub fn split_frontmatter<'a>(content: &'a str, path: &Path) -> Result<SplitDocument<'a>, DomainError> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    let Some(after_open) = content.strip_prefix("---") else {
        return Err(DomainError::frontmatter(
            path,
            "missing frontmatter delimiter (---)",
        ));
    };

    let end = after_open.find("\n---").ok_or_else(|| {
        DomainError::frontmatter(path, "missing closing frontmatter delimiter (---)")
    })?;

    let yaml = after_open[..end].trim();
    let rest = &after_open[end + 4..];
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => "",
    };

    Ok(SplitDocument {
        yaml,
        body: body.trim_start_matches(['\r', '\n']),
    })
}

/// Deserialize a frontmatter block, reporting failures against `path`.
pub fn parse_frontmatter<T>(yaml: &str, path: &Path) -> Result<T, DomainError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_yaml_ng::from_str(yaml).map_err(|err| DomainError::frontmatter(path, err.to_string()))
}

/// Parse a content date written as `YYYY-MM-DD` or as an RFC 3339 timestamp.
pub fn parse_content_date(value: &str) -> Result<Date, DomainError> {
    let trimmed = value.trim();
    if let Ok(date) = Date::parse(trimmed, DATE_FORMAT) {
        return Ok(date);
    }

    OffsetDateTime::parse(trimmed, &Rfc3339)
        .map(|timestamp| timestamp.date())
        .map_err(|_| DomainError::InvalidDate {
            value: trimmed.to_string(),
        })
}

/// Trim tags, drop empties and duplicates while keeping author order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || seen.iter().any(|existing: &String| existing.eq_ignore_ascii_case(trimmed)) {
            continue;
        }
        seen.push(trimmed.to_string());
    }
    seen
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::One(value)) => value.split(',').map(str::to_string).collect(),
        Some(StringOrList::Many(values)) => values,
    })
}
