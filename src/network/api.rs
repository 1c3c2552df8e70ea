//! News API contract - request parameters and the client trait

use async_trait::async_trait;
use serde::Serialize;

use crate::constants::{
    DEFAULT_LANGUAGE, DEFAULT_PAGE_SIZE, EVERYTHING_PATH, FIRST_PAGE, TOP_HEADLINES_PATH,
};
use crate::error::NewsError;
use crate::models::{NewsResponse, SortBy};

/// Query parameters of `GET /v2/everything`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(rename = "q")]
    pub query: String,
    pub api_key: String,
    pub sort_by: SortBy,
    pub page_size: u32,
    pub language: String,
    /// Only sent past the first page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, api_key: impl Into<String>) -> Self {
        SearchRequest {
            query: query.into(),
            api_key: api_key.into(),
            sort_by: SortBy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            language: DEFAULT_LANGUAGE.to_string(),
            page: None,
        }
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = (page > FIRST_PAGE).then_some(page);
        self
    }
}

/// Query parameters of `GET /v2/top-headlines`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlinesRequest {
    pub api_key: String,
    pub page_size: u32,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl HeadlinesRequest {
    pub fn new(api_key: impl Into<String>) -> Self {
        HeadlinesRequest {
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
            language: DEFAULT_LANGUAGE.to_string(),
            page: None,
        }
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = (page > FIRST_PAGE).then_some(page);
        self
    }
}

/// A page fetch chosen by the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchRequest {
    Search(SearchRequest),
    Headlines(HeadlinesRequest),
}

impl FetchRequest {
    /// Endpoint path, for logging
    pub fn endpoint(&self) -> &'static str {
        match self {
            FetchRequest::Search(_) => EVERYTHING_PATH,
            FetchRequest::Headlines(_) => TOP_HEADLINES_PATH,
        }
    }

    /// Search phrase, if any. Never exposes the API key.
    pub fn query(&self) -> Option<&str> {
        match self {
            FetchRequest::Search(search) => Some(&search.query),
            FetchRequest::Headlines(_) => None,
        }
    }
}

/// Remote news source
///
/// Implemented over HTTP by [`ReqwestNewsClient`](crate::network::ReqwestNewsClient);
/// tests substitute an in-memory implementation.
#[async_trait]
pub trait NewsApi: Send + Sync {
    /// Full-text search over all articles.
    ///
    /// # Errors
    /// `NewsError::Network` on transport failure, `NewsError::Api` on a
    /// non-success status or undecodable payload.
    async fn search_news(&self, request: &SearchRequest) -> Result<NewsResponse, NewsError>;

    /// Current top headlines.
    ///
    /// # Errors
    /// Same failure modes as [`NewsApi::search_news`].
    async fn get_top_headlines(&self, request: &HeadlinesRequest)
        -> Result<NewsResponse, NewsError>;

    /// Dispatch a [`FetchRequest`] to the matching endpoint
    async fn fetch(&self, request: &FetchRequest) -> Result<NewsResponse, NewsError> {
        match request {
            FetchRequest::Search(search) => self.search_news(search).await,
            FetchRequest::Headlines(headlines) => self.get_top_headlines(headlines).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_defaults() {
        let req = SearchRequest::new("technology", "key");
        assert_eq!(req.sort_by, SortBy::PublishedAt);
        assert_eq!(req.page_size, 20);
        assert_eq!(req.language, "en");
        assert_eq!(req.page, None);
    }

    #[test]
    fn test_first_page_is_not_sent() {
        assert_eq!(SearchRequest::new("q", "k").page(1).page, None);
        assert_eq!(SearchRequest::new("q", "k").page(3).page, Some(3));
        assert_eq!(HeadlinesRequest::new("k").page(1).page, None);
        assert_eq!(HeadlinesRequest::new("k").page(2).page, Some(2));
    }

    #[test]
    fn test_search_request_wire_names() {
        let req = SearchRequest::new("rust lang", "secret").sort_by(SortBy::Popularity);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["q"], "rust lang");
        assert_eq!(value["apiKey"], "secret");
        assert_eq!(value["sortBy"], "popularity");
        assert_eq!(value["pageSize"], 20);
        assert_eq!(value["language"], "en");
        assert!(value.get("page").is_none());
    }
}
