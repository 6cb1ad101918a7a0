//! "This URL changed" pings to search engines.

use std::sync::Arc;

use metrics::counter;
use time::{Date, Duration};
use tracing::{info, warn};
use url::Url;

use crate::application::{
    chrome::SiteIdentity,
    error::AppError,
    index::ContentIndex,
    repos::{NotifyOutcome, UrlNotifier},
    sitemap::sitemap_entries,
};

/// Which URLs a notification run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSelection {
    /// Every page listed in the sitemap.
    All,
    /// Detail pages dated within the last `days` days.
    Recent { days: u32 },
    /// Explicit absolute URLs or site-relative paths.
    Explicit(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub urls: Vec<String>,
    pub dry_run: bool,
    pub outcomes: Vec<(&'static str, NotifyOutcome)>,
}

impl NotifyReport {
    pub fn submitted(&self) -> usize {
        self.outcomes.iter().map(|(_, outcome)| outcome.submitted).sum()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| outcome.failed.len())
            .sum()
    }

    /// True when URLs were due but every notifier failed on all of them.
    pub fn nothing_submitted(&self) -> bool {
        !self.dry_run && self.submitted() == 0 && self.failed() > 0
    }
}

/// Resolve a selection into absolute URLs, deduplicated in first-seen order.
pub fn select_urls(
    index: &ContentIndex,
    identity: &SiteIdentity,
    selection: &UrlSelection,
    today: Date,
) -> Result<Vec<String>, AppError> {
    let mut urls: Vec<String> = match selection {
        UrlSelection::All => sitemap_entries(index)
            .into_iter()
            .map(|entry| identity.url_for(&entry.path))
            .collect(),
        UrlSelection::Recent { days } => {
            let cutoff = today
                .checked_sub(Duration::days(i64::from(*days)))
                .ok_or_else(|| {
                    AppError::validation(format!("--recent {days} reaches before the earliest date"))
                })?;
            index
                .detail_paths()
                .into_iter()
                .filter(|path| path.lastmod.is_some_and(|date| date >= cutoff))
                .map(|path| identity.url_for(&path.path))
                .collect()
        }
        UrlSelection::Explicit(values) => values
            .iter()
            .map(|value| resolve_url(identity, value))
            .collect::<Result<_, _>>()?,
    };

    let mut seen = std::collections::HashSet::new();
    urls.retain(|url| seen.insert(url.clone()));
    Ok(urls)
}

fn resolve_url(identity: &SiteIdentity, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.starts_with('/') {
        return Ok(identity.url_for(value));
    }
    let url = Url::parse(value)
        .map_err(|err| AppError::validation(format!("invalid url `{value}`: {err}")))?;
    if url.host_str() != identity.base_url.host_str() {
        return Err(AppError::validation(format!(
            "url `{value}` does not belong to {}",
            identity.host()
        )));
    }
    Ok(url.to_string())
}

pub struct NotifyService {
    notifiers: Vec<Arc<dyn UrlNotifier>>,
}

impl NotifyService {
    pub fn new(notifiers: Vec<Arc<dyn UrlNotifier>>) -> Self {
        Self { notifiers }
    }

    pub fn notifier_names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|notifier| notifier.name()).collect()
    }

    /// Send `urls` to every notifier. A notifier that fails outright marks all
    /// URLs failed for that notifier; the other notifiers still run.
    pub async fn run(&self, urls: Vec<String>, dry_run: bool) -> NotifyReport {
        let mut report = NotifyReport {
            urls,
            dry_run,
            outcomes: Vec::new(),
        };

        if dry_run {
            for url in &report.urls {
                info!(target = "application::notify", %url, "dry run; not submitting");
            }
            return report;
        }
        if report.urls.is_empty() {
            info!(target = "application::notify", "no urls selected");
            return report;
        }

        for notifier in &self.notifiers {
            let name = notifier.name();
            let outcome = match notifier.notify(&report.urls).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(
                        target = "application::notify",
                        notifier = name,
                        error = %err,
                        "notifier failed"
                    );
                    NotifyOutcome {
                        submitted: 0,
                        failed: report
                            .urls
                            .iter()
                            .map(|url| (url.clone(), err.to_string()))
                            .collect(),
                    }
                }
            };

            for (url, reason) in &outcome.failed {
                warn!(
                    target = "application::notify",
                    notifier = name,
                    %url,
                    error = %reason,
                    "url submission failed"
                );
            }
            counter!("inkpress_notify_urls_total", "notifier" => name, "outcome" => "submitted")
                .increment(outcome.submitted as u64);
            counter!("inkpress_notify_urls_total", "notifier" => name, "outcome" => "failed")
                .increment(outcome.failed.len() as u64);
            info!(
                target = "application::notify",
                notifier = name,
                submitted = outcome.submitted,
                failed = outcome.failed.len(),
                "notifier finished"
            );
            report.outcomes.push((name, outcome));
        }
        report
    }
}
