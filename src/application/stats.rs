//! View, upvote and report counters kept in the hosted stats table.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, instrument};

use crate::application::{error::AppError, repos::StatsStore};
use crate::domain::{
    entities::StatsRecord,
    types::{ContentKind, StatCounter},
};

const MAX_TOP_LIMIT: usize = 100;

#[derive(Clone)]
pub struct StatsService {
    store: Option<Arc<dyn StatsStore>>,
}

impl StatsService {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A service that answers every call with [`AppError::Unavailable`].
    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    #[instrument(skip(self))]
    pub async fn increment(
        &self,
        kind: ContentKind,
        slug: &str,
        counter: StatCounter,
    ) -> Result<StatsRecord, AppError> {
        validate_slug(slug)?;
        let store = self.store()?;
        let record = store.increment(kind, slug, counter).await.inspect_err(|_| {
            counter!("inkpress_stats_requests_total", "op" => "increment", "outcome" => "error")
                .increment(1);
        })?;
        counter!("inkpress_stats_requests_total", "op" => "increment", "outcome" => "ok")
            .increment(1);
        debug!(
            target = "application::stats",
            slug,
            counter = counter.as_str(),
            "counter incremented"
        );
        Ok(record)
    }

    /// Current counters; a missing row reads as all zeroes.
    #[instrument(skip(self))]
    pub async fn get(&self, kind: ContentKind, slug: &str) -> Result<StatsRecord, AppError> {
        validate_slug(slug)?;
        let store = self.store()?;
        let record = store.fetch(kind, slug).await.inspect_err(|_| {
            counter!("inkpress_stats_requests_total", "op" => "get", "outcome" => "error")
                .increment(1);
        })?;
        counter!("inkpress_stats_requests_total", "op" => "get", "outcome" => "ok").increment(1);
        Ok(record.unwrap_or_else(|| StatsRecord::empty(kind, slug)))
    }

    pub async fn top(
        &self,
        kind: ContentKind,
        counter: StatCounter,
        limit: usize,
    ) -> Result<Vec<StatsRecord>, AppError> {
        if limit == 0 || limit > MAX_TOP_LIMIT {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {MAX_TOP_LIMIT}"
            )));
        }
        let store = self.store()?;
        Ok(store.top(kind, counter, limit).await?)
    }

    fn store(&self) -> Result<&Arc<dyn StatsStore>, AppError> {
        self.store
            .as_ref()
            .ok_or_else(|| AppError::unavailable("stats storage is not configured"))
    }
}

fn validate_slug(slug: &str) -> Result<(), AppError> {
    let valid = !slug.is_empty()
        && slug.len() <= 200
        && slug
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!("invalid slug `{slug}`")))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::application::repos::RepoError;

    #[derive(Default)]
    struct MemoryStats {
        rows: Mutex<HashMap<(ContentKind, String), StatsRecord>>,
    }

    #[async_trait]
    impl StatsStore for MemoryStats {
        async fn increment(
            &self,
            kind: ContentKind,
            slug: &str,
            counter: StatCounter,
        ) -> Result<StatsRecord, RepoError> {
            let mut rows = self.rows.lock().expect("lock");
            let row = rows
                .entry((kind, slug.to_string()))
                .or_insert_with(|| StatsRecord::empty(kind, slug));
            match counter {
                StatCounter::Views => row.views += 1,
                StatCounter::Upvotes => row.upvotes += 1,
                StatCounter::Reports => row.reports += 1,
            }
            Ok(row.clone())
        }

        async fn fetch(
            &self,
            kind: ContentKind,
            slug: &str,
        ) -> Result<Option<StatsRecord>, RepoError> {
            let rows = self.rows.lock().expect("lock");
            Ok(rows.get(&(kind, slug.to_string())).cloned())
        }

        async fn top(
            &self,
            kind: ContentKind,
            _counter: StatCounter,
            limit: usize,
        ) -> Result<Vec<StatsRecord>, RepoError> {
            let rows = self.rows.lock().expect("lock");
            let mut found: Vec<_> = rows
                .iter()
                .filter(|((k, _), _)| *k == kind)
                .map(|(_, row)| row.clone())
                .collect();
            found.sort_by(|a, b| b.views.cmp(&a.views));
            found.truncate(limit);
            Ok(found)
        }
    }

    #[tokio::test]
    async fn increments_and_reads_back() {
        let service = StatsService::new(Arc::new(MemoryStats::default()));
        service
            .increment(ContentKind::Blog, "hello", StatCounter::Views)
            .await
            .expect("increment");
        let row = service
            .increment(ContentKind::Blog, "hello", StatCounter::Views)
            .await
            .expect("increment");
        assert_eq!(row.views, 2);

        let fetched = service.get(ContentKind::Blog, "hello").await.expect("get");
        assert_eq!(fetched.views, 2);
        assert_eq!(fetched.upvotes, 0);
    }

    #[tokio::test]
    async fn missing_rows_read_as_zero() {
        let service = StatsService::new(Arc::new(MemoryStats::default()));
        let row = service.get(ContentKind::Til, "nothing").await.expect("get");
        assert_eq!(row, StatsRecord::empty(ContentKind::Til, "nothing"));
    }

    #[tokio::test]
    async fn disabled_service_is_unavailable() {
        let service = StatsService::disabled();
        let err = service
            .get(ContentKind::Blog, "hello")
            .await
            .expect_err("disabled");
        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_slugs_and_limits() {
        let service = StatsService::new(Arc::new(MemoryStats::default()));
        let err = service
            .increment(ContentKind::Blog, "../etc", StatCounter::Views)
            .await
            .expect_err("invalid");
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .top(ContentKind::Blog, StatCounter::Views, 0)
            .await
            .expect_err("invalid");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
