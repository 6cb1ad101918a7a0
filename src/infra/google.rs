//! Google Indexing API client authenticated with a service account.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use url::Url;

use crate::application::repos::{NotifyOutcome, RepoError, UrlNotifier};
use crate::infra::{error::InfraError, supabase::user_agent};

pub const INDEXING_SCOPE: &str = "https://www.googleapis.com/auth/indexing";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a service-account key file that the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone)]
pub struct GoogleIndexingNotifier {
    client: Client,
    key: ServiceAccountKey,
    endpoint: Url,
}

impl GoogleIndexingNotifier {
    pub fn new(key: ServiceAccountKey, endpoint: Url, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::http(err.to_string()))?;
        Ok(Self {
            client,
            key,
            endpoint,
        })
    }

    /// Read a service-account JSON key file.
    pub fn load_key(path: &Path) -> Result<ServiceAccountKey, InfraError> {
        let contents =
            std::fs::read_to_string(path).map_err(|err| InfraError::path(path.display(), err))?;
        serde_json::from_str(&contents).map_err(|err| {
            InfraError::credentials(format!("invalid service account file {}: {err}", path.display()))
        })
    }

    /// Signed RS256 assertion for the token endpoint.
    pub fn assertion(&self, now: OffsetDateTime) -> Result<String, InfraError> {
        let issued_at = now.unix_timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: INDEXING_SCOPE,
            aud: &self.key.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|err| InfraError::credentials(format!("invalid private key: {err}")))?;
        encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|err| InfraError::credentials(format!("failed to sign assertion: {err}")))
    }

    async fn access_token(&self) -> Result<String, RepoError> {
        let assertion = self
            .assertion(OffsetDateTime::now_utc())
            .map_err(RepoError::remote)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(RepoError::remote)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepoError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| RepoError::Decode(err.to_string()))?;
        Ok(token.access_token)
    }

    async fn publish(&self, token: &str, url: &str) -> Result<(), String> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .json(&PublishRequest {
                url,
                kind: "URL_UPDATED",
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

#[async_trait]
impl UrlNotifier for GoogleIndexingNotifier {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn notify(&self, urls: &[String]) -> Result<NotifyOutcome, RepoError> {
        let token = self.access_token().await?;
        let mut outcome = NotifyOutcome::default();
        for url in urls {
            match self.publish(&token, url).await {
                Ok(()) => {
                    debug!(target = "infra::google", %url, "url published");
                    outcome.submitted += 1;
                }
                Err(reason) => outcome.failed.push((url.clone(), reason)),
            }
        }
        Ok(outcome)
    }
}
