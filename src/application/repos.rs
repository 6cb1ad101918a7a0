//! Traits describing the adapters the application talks to.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::StatsRecord;
use crate::domain::types::{ContentKind, StatCounter};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("failed to read `{}`: {message}", path.display())]
    Io { path: PathBuf, message: String },
    #[error("remote service error: {0}")]
    Remote(String),
    #[error("unexpected response status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepoError {
    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn remote(err: impl std::fmt::Display) -> Self {
        Self::Remote(err.to_string())
    }
}

/// A Markdown file as read from the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub contents: String,
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Every `.md`/`.mdx` document belonging to `kind`, in a stable order.
    async fn list_documents(&self, kind: ContentKind) -> Result<Vec<SourceDocument>, RepoError>;

    /// Raw contents of `data/<name>.json`, `None` when the file is absent.
    async fn read_data(&self, name: &str) -> Result<Option<String>, RepoError>;
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Atomically bump `counter` and return the updated row.
    async fn increment(
        &self,
        kind: ContentKind,
        slug: &str,
        counter: StatCounter,
    ) -> Result<StatsRecord, RepoError>;

    async fn fetch(&self, kind: ContentKind, slug: &str) -> Result<Option<StatsRecord>, RepoError>;

    async fn top(
        &self,
        kind: ContentKind,
        counter: StatCounter,
        limit: usize,
    ) -> Result<Vec<StatsRecord>, RepoError>;
}

/// Result of one notifier run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub submitted: usize,
    pub failed: Vec<(String, String)>,
}

/// A search-engine endpoint that accepts "this URL changed" pings.
#[async_trait]
pub trait UrlNotifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submit `urls`. Failures for individual URLs are reported in the outcome;
    /// an `Err` means nothing could be sent at all.
    async fn notify(&self, urls: &[String]) -> Result<NotifyOutcome, RepoError>;
}
