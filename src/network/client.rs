//! HTTP client wrapper - executes news API requests and decodes envelopes

use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;

use crate::constants::{EVERYTHING_PATH, TOP_HEADLINES_PATH, USER_AGENT};
use crate::error::NewsError;
use crate::models::{ApiErrorBody, NewsResponse};
use crate::network::api::{HeadlinesRequest, NewsApi, SearchRequest};

/// News API client backed by reqwest
#[derive(Clone, Debug)]
pub struct ReqwestNewsClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestNewsClient {
    /// Client for the given API host, e.g. `https://newsapi.org`
    pub fn new(base_url: impl Into<String>) -> Result<Self, NewsError> {
        Ok(Self::with_client(create_client()?, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        ReqwestNewsClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<NewsResponse, NewsError> {
        let url = format!("{}/{}", self.base_url, path);
        let start = Instant::now();

        let resp = self.client.get(&url).query(query).send().await.map_err(|e| {
            tracing::warn!(path, error = %e, "News request failed");
            NewsError::from(e)
        })?;

        let status = resp.status();
        let body = resp.text().await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorBody>(&body).unwrap_or_default();
            tracing::warn!(path, status = status.as_u16(), code = ?detail.code, elapsed_ms, "News API returned an error");
            let message = match detail.message {
                Some(message) if !message.trim().is_empty() => message,
                _ => format!("HTTP {}", status),
            };
            return Err(NewsError::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        let response: NewsResponse = serde_json::from_str(&body).map_err(|e| NewsError::Api {
            status: Some(status.as_u16()),
            message: format!("Invalid response payload: {}", e),
        })?;

        tracing::debug!(path, articles = response.articles.len(), elapsed_ms, "News request completed");
        Ok(response)
    }
}

#[async_trait]
impl NewsApi for ReqwestNewsClient {
    async fn search_news(&self, request: &SearchRequest) -> Result<NewsResponse, NewsError> {
        self.get(EVERYTHING_PATH, request).await
    }

    async fn get_top_headlines(
        &self,
        request: &HeadlinesRequest,
    ) -> Result<NewsResponse, NewsError> {
        self.get(TOP_HEADLINES_PATH, request).await
    }
}

/// Create an HTTP client with transport defaults and our user agent
pub fn create_client() -> Result<reqwest::Client, NewsError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| NewsError::Network(format!("Failed to build HTTP client: {}", e)))
}
