// SPDX-License-Identifier: MPL-2.0

use crate::api::types::UserSummary;
use crate::config::{DEFAULT_API_BASE, MENTION_SEARCH_PATH};
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Anything that can look users up by (partial) display name.
///
/// The mention pipeline only ever talks to this trait, so tests and hosts can
/// substitute their own directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn search_users(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<UserSummary>, ClientError>;

    /// Whether requests will carry a credential.
    fn is_authenticated(&self) -> bool {
        true
    }
}

/// Thin wrapper over the GigLink REST API.
pub struct GigLinkClient {
    http: reqwest::Client,
    api_base: Url,
    token: Option<String>,
}

impl GigLinkClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            token: None,
        }
    }

    pub fn with_api_base(api_base: &str) -> Result<Self, ClientError> {
        let api_base =
            Url::parse(api_base).map_err(|e| ClientError::InvalidUrl(format!("{api_base}: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_base,
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn search_url(&self, query: &str, limit: usize) -> Result<Url, ClientError> {
        let mut url = self
            .api_base
            .join(MENTION_SEARCH_PATH)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }
}

impl Default for GigLinkClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for GigLinkClient {
    async fn search_users(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<UserSummary>, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        let url = self.search_url(query, limit)?;
        debug!(%url, "searching users");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header("x-auth-token", token)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        let client = GigLinkClient::with_api_base("https://api.giglink.test").unwrap();
        let url = client.search_url("Alice Smith", 5).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.giglink.test/api/mentions/search?q=Alice+Smith&limit=5"
        );
    }

    #[test]
    fn test_blank_token_is_not_a_credential() {
        let client = GigLinkClient::new().with_token(Some("  ".to_string()));
        assert!(!client.is_authenticated());
        let client = GigLinkClient::new().with_token(Some("t0k".to_string()));
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_invalid_api_base() {
        assert!(matches!(
            GigLinkClient::with_api_base("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_search_without_token_fails_fast() {
        let client = GigLinkClient::new();
        let err = client.search_users("al", 5).await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }
}
