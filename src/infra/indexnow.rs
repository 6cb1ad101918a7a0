//! IndexNow submission.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::application::{
    chrome::SiteIdentity,
    repos::{NotifyOutcome, RepoError, UrlNotifier},
};
use crate::infra::{error::InfraError, supabase::user_agent};

/// Maximum URLs the protocol accepts per request.
pub const MAX_URLS_PER_REQUEST: usize = 10_000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Submission<'a> {
    host: &'a str,
    key: &'a str,
    key_location: &'a str,
    url_list: &'a [String],
}

#[derive(Debug, Clone)]
pub struct IndexNowNotifier {
    client: Client,
    endpoint: Url,
    key: String,
    host: String,
    key_location: String,
}

impl IndexNowNotifier {
    pub fn new(
        identity: &SiteIdentity,
        key: impl Into<String>,
        endpoint: Url,
        timeout: Duration,
    ) -> Result<Self, InfraError> {
        let key = key.into();
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            key_location: identity.url_for(&key_file_name(&key)),
            host: identity.host(),
            key,
        })
    }

    async fn submit(&self, urls: &[String]) -> Result<(), String> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&Submission {
                host: &self.host,
                key: &self.key,
                key_location: &self.key_location,
                url_list: urls,
            })
            .send()
            .await
            .map_err(|err| err.to_string())?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(format!("status {}: {}", status.as_u16(), body.trim()))
        }
    }
}

/// The key file served from the site root, `<key>.txt`.
pub fn key_file_name(key: &str) -> String {
    format!("{key}.txt")
}

#[async_trait]
impl UrlNotifier for IndexNowNotifier {
    fn name(&self) -> &'static str {
        "indexnow"
    }

    async fn notify(&self, urls: &[String]) -> Result<NotifyOutcome, RepoError> {
        let mut outcome = NotifyOutcome::default();
        for chunk in urls.chunks(MAX_URLS_PER_REQUEST) {
            match self.submit(chunk).await {
                Ok(()) => {
                    debug!(target = "infra::indexnow", count = chunk.len(), "batch accepted");
                    outcome.submitted += chunk.len();
                }
                Err(reason) => outcome
                    .failed
                    .extend(chunk.iter().map(|url| (url.clone(), reason.clone()))),
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::application::chrome::fixtures::identity;

    fn notifier(server: &MockServer) -> IndexNowNotifier {
        IndexNowNotifier::new(
            &identity(),
            "abc123",
            Url::parse(&server.url("/indexnow")).expect("url"),
            Duration::from_secs(5),
        )
        .expect("notifier")
    }

    #[tokio::test]
    async fn submits_host_key_and_urls() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/indexnow").json_body(json!({
                    "host": "ink.example.com",
                    "key": "abc123",
                    "keyLocation": "https://ink.example.com/abc123.txt",
                    "urlList": ["https://ink.example.com/", "https://ink.example.com/til/x/"]
                }));
                then.status(202);
            })
            .await;

        let outcome = notifier(&server)
            .notify(&[
                "https://ink.example.com/".to_string(),
                "https://ink.example.com/til/x/".to_string(),
            ])
            .await
            .expect("outcome");
        mock.assert_async().await;
        assert_eq!(outcome.submitted, 2);
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test]
    async fn large_lists_are_chunked() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/indexnow");
                then.status(200);
            })
            .await;

        let urls: Vec<String> = (0..MAX_URLS_PER_REQUEST + 1)
            .map(|n| format!("https://ink.example.com/p{n}/"))
            .collect();
        let outcome = notifier(&server).notify(&urls).await.expect("outcome");
        mock.assert_hits_async(2).await;
        assert_eq!(outcome.submitted, urls.len());
    }

    #[tokio::test]
    async fn rejected_batches_mark_urls_failed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/indexnow");
                then.status(403).body("key not valid");
            })
            .await;

        let outcome = notifier(&server)
            .notify(&["https://ink.example.com/".to_string()])
            .await
            .expect("outcome");
        assert_eq!(outcome.submitted, 0);
        assert_eq!(outcome.failed.len(), 1);
        assert!(outcome.failed[0].1.contains("403"));
    }
}
