//! Shared domain enumerations.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// The kinds of content the site publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Blog,
    SillyQuestion,
    Til,
    TechnicalTerm,
    Cheatsheet,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Blog,
        ContentKind::SillyQuestion,
        ContentKind::Til,
        ContentKind::TechnicalTerm,
        ContentKind::Cheatsheet,
    ];

    /// Identifier stored in the stats table `type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Blog => "blog",
            ContentKind::SillyQuestion => "silly-question",
            ContentKind::Til => "til",
            ContentKind::TechnicalTerm => "technical-term",
            ContentKind::Cheatsheet => "cheatsheet",
        }
    }

    /// URL section and content directory name.
    pub fn section(self) -> &'static str {
        match self {
            ContentKind::Blog => "blog",
            ContentKind::SillyQuestion => "silly-questions",
            ContentKind::Til => "til",
            ContentKind::TechnicalTerm => "technical-terms",
            ContentKind::Cheatsheet => "cheatsheets",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Blog => "Blog",
            ContentKind::SillyQuestion => "Silly Questions",
            ContentKind::Til => "Today I Learned",
            ContentKind::TechnicalTerm => "Technical Terms",
            ContentKind::Cheatsheet => "Cheatsheets",
        }
    }

    /// Site-relative path of a detail page, with a trailing slash.
    pub fn path_for(self, slug: &str) -> String {
        format!("/{}/{slug}/", self.section())
    }

    /// Site-relative path of the section index.
    pub fn index_path(self) -> String {
        format!("/{}/", self.section())
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value || kind.section() == value)
            .ok_or_else(|| DomainError::validation(format!("unknown content type `{value}`")))
    }
}

/// Counters kept per content item in the stats table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCounter {
    Views,
    Upvotes,
    Reports,
}

impl StatCounter {
    pub fn as_str(self) -> &'static str {
        match self {
            StatCounter::Views => "views",
            StatCounter::Upvotes => "upvotes",
            StatCounter::Reports => "reports",
        }
    }
}

impl fmt::Display for StatCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatCounter {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "views" | "view" => Ok(StatCounter::Views),
            "upvotes" | "upvote" => Ok(StatCounter::Upvotes),
            "reports" | "report" => Ok(StatCounter::Reports),
            other => Err(DomainError::validation(format!(
                "unknown stats counter `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_kind_parses_type_and_section_names() {
        assert_eq!(
            "silly-question".parse::<ContentKind>().unwrap(),
            ContentKind::SillyQuestion
        );
        assert_eq!(
            "technical-terms".parse::<ContentKind>().unwrap(),
            ContentKind::TechnicalTerm
        );
        assert!("podcast".parse::<ContentKind>().is_err());
    }

    #[test]
    fn detail_paths_use_section_names() {
        assert_eq!(
            ContentKind::SillyQuestion.path_for("why-sky"),
            "/silly-questions/why-sky/"
        );
        assert_eq!(ContentKind::Til.index_path(), "/til/");
    }

    #[test]
    fn stat_counter_accepts_singular_forms() {
        assert_eq!("upvote".parse::<StatCounter>().unwrap(), StatCounter::Upvotes);
        assert_eq!(StatCounter::Reports.as_str(), "reports");
    }
}
