use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain entity `{entity}` not found")]
    NotFound { entity: &'static str },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
    #[error("invalid frontmatter in `{}`: {reason}", path.display())]
    Frontmatter { path: PathBuf, reason: String },
    #[error("invalid date `{value}`: expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate { value: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn frontmatter(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Frontmatter {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
