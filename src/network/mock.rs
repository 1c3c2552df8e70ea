//! In-memory `NewsApi` for controller and actor tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::NewsError;
use crate::models::{Article, NewsResponse};
use crate::network::api::{FetchRequest, HeadlinesRequest, NewsApi, SearchRequest};

/// Records every call and answers from a queue of canned results.
///
/// A gated mock holds each call until [`MockNewsApi::release`] hands out a
/// permit, which keeps a fetch in flight for as long as a test needs. A hook
/// set with [`MockNewsApi::on_response`] runs after the result is chosen and
/// before the call returns.
pub(crate) struct MockNewsApi {
    calls: Mutex<Vec<FetchRequest>>,
    results: Mutex<VecDeque<Result<NewsResponse, NewsError>>>,
    gate: Option<Semaphore>,
    hook: Mutex<Option<Box<dyn Fn() + Send + Sync>>>,
}

impl MockNewsApi {
    pub(crate) fn new() -> Self {
        MockNewsApi {
            calls: Mutex::new(Vec::new()),
            results: Mutex::new(VecDeque::new()),
            gate: None,
            hook: Mutex::new(None),
        }
    }

    pub(crate) fn gated() -> Self {
        MockNewsApi {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub(crate) fn push_articles(&self, articles: Vec<Article>) {
        let response = NewsResponse {
            status: "ok".to_string(),
            total_results: articles.len() as u32,
            articles,
        };
        self.results.lock().unwrap().push_back(Ok(response));
    }

    pub(crate) fn push_error(&self, error: NewsError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub(crate) fn on_response(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub(crate) fn calls(&self) -> Vec<FetchRequest> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, call: FetchRequest) -> Result<NewsResponse, NewsError> {
        self.calls.lock().unwrap().push(call);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let result = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(NewsResponse {
                    status: "ok".to_string(),
                    total_results: 0,
                    articles: Vec::new(),
                })
            });
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook();
        }
        result
    }
}

#[async_trait]
impl NewsApi for MockNewsApi {
    async fn search_news(&self, request: &SearchRequest) -> Result<NewsResponse, NewsError> {
        self.respond(FetchRequest::Search(request.clone())).await
    }

    async fn get_top_headlines(
        &self,
        request: &HeadlinesRequest,
    ) -> Result<NewsResponse, NewsError> {
        self.respond(FetchRequest::Headlines(request.clone())).await
    }
}
