//! Stats table access through Supabase's PostgREST endpoints.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::application::repos::{RepoError, StatsStore};
use crate::config::StatsSettings;
use crate::domain::{
    entities::StatsRecord,
    types::{ContentKind, StatCounter},
};
use crate::infra::error::InfraError;

#[derive(Debug, Clone)]
pub struct SupabaseStatsStore {
    client: Client,
    rest_base: Url,
    api_key: String,
    table: String,
    rpc: String,
}

#[derive(Serialize)]
struct IncrementParams<'a> {
    p_type: &'a str,
    p_slug: &'a str,
    p_column: &'a str,
}

impl SupabaseStatsStore {
    /// `None` when stats are not configured.
    pub fn from_settings(settings: &StatsSettings) -> Result<Option<Self>, InfraError> {
        let (Some(base), Some(api_key)) = (settings.supabase_url.as_ref(), settings.api_key.as_ref())
        else {
            return Ok(None);
        };
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;
        let rest_base = base
            .join("rest/v1/")
            .map_err(|err| InfraError::configuration(err.to_string()))?;

        Ok(Some(Self {
            client,
            rest_base,
            api_key: api_key.clone(),
            table: settings.table.clone(),
            rpc: settings.rpc.clone(),
        }))
    }

    fn endpoint(&self, path: &str) -> Result<Url, RepoError> {
        self.rest_base
            .join(path)
            .map_err(|err| RepoError::InvalidInput {
                message: err.to_string(),
            })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn rows(&self, request: RequestBuilder) -> Result<Vec<StatsRecord>, RepoError> {
        let response = self.authorized(request).send().await.map_err(RepoError::remote)?;
        let body = checked(response).await?;
        serde_json::from_value(body).map_err(|err| RepoError::Decode(err.to_string()))
    }
}

#[async_trait]
impl StatsStore for SupabaseStatsStore {
    async fn increment(
        &self,
        kind: ContentKind,
        slug: &str,
        counter: StatCounter,
    ) -> Result<StatsRecord, RepoError> {
        let url = self.endpoint(&format!("rpc/{}", self.rpc))?;
        let params = IncrementParams {
            p_type: kind.as_str(),
            p_slug: slug,
            p_column: counter.as_str(),
        };
        debug!(target = "infra::supabase", %url, slug, counter = counter.as_str(), "calling increment rpc");

        let response = self
            .authorized(self.client.post(url).json(&params))
            .send()
            .await
            .map_err(RepoError::remote)?;
        let body = checked(response).await?;

        // Set-returning functions answer with an array, scalar ones with an object.
        let row = match body {
            Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
            Value::Array(_) | Value::Null => return Ok(StatsRecord::empty(kind, slug)),
            other => other,
        };
        serde_json::from_value(row).map_err(|err| RepoError::Decode(err.to_string()))
    }

    async fn fetch(&self, kind: ContentKind, slug: &str) -> Result<Option<StatsRecord>, RepoError> {
        let url = self.endpoint(&self.table)?;
        let request = self.client.get(url).query(&[
            ("select", "*".to_string()),
            ("type", format!("eq.{}", kind.as_str())),
            ("slug", format!("eq.{slug}")),
        ]);
        Ok(self.rows(request).await?.into_iter().next())
    }

    async fn top(
        &self,
        kind: ContentKind,
        counter: StatCounter,
        limit: usize,
    ) -> Result<Vec<StatsRecord>, RepoError> {
        let url = self.endpoint(&self.table)?;
        let request = self.client.get(url).query(&[
            ("select", "*".to_string()),
            ("type", format!("eq.{}", kind.as_str())),
            ("order", format!("{}.desc", counter.as_str())),
            ("limit", limit.to_string()),
        ]);
        self.rows(request).await
    }
}

async fn checked(response: Response) -> Result<Value, RepoError> {
    let status = response.status();
    let text = response.text().await.map_err(RepoError::remote)?;
    if !status.is_success() {
        return Err(RepoError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|err| RepoError::Decode(err.to_string()))
}

pub(crate) fn user_agent() -> &'static str {
    concat!("inkpress/", env!("CARGO_PKG_VERSION"))
}
