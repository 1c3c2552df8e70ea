//! Command handlers - fetch orchestration, filters and favorites

use std::sync::Arc;

use crate::app::state::{FetchHandle, FetchState, NewsController, UiState};
use crate::constants::FIRST_PAGE;
use crate::error::NewsError;
use crate::models::{Article, Category, NewsResponse, SortBy};
use crate::network::{FetchRequest, HeadlinesRequest, SearchRequest};

impl NewsController {
    // ========================
    // Fetching
    // ========================

    /// Fetch the next page for the selected category.
    ///
    /// Returns `None` without dispatching anything while another fetch is in
    /// flight.
    pub fn load_news(self: &Arc<Self>, api_key: &str) -> Option<FetchHandle> {
        let mut fetch = self.lock_fetch();
        if fetch.is_in_flight() {
            tracing::debug!(page = fetch.page, "Fetch in flight, ignoring load");
            return None;
        }
        Some(self.dispatch_page(&mut fetch, api_key))
    }

    /// Fetch the next page only if none is in flight and the last page was
    /// not empty.
    pub fn load_more_news(self: &Arc<Self>, api_key: &str) -> Option<FetchHandle> {
        let mut fetch = self.lock_fetch();
        if fetch.is_in_flight() || !fetch.has_more {
            tracing::debug!(
                page = fetch.page,
                has_more = fetch.has_more,
                "Not loading more"
            );
            return None;
        }
        Some(self.dispatch_page(&mut fetch, api_key))
    }

    /// Search all articles for `query`, replacing the list.
    ///
    /// Cancels any outstanding fetch rather than waiting for it.
    pub fn search_news(self: &Arc<Self>, query: &str, api_key: &str) -> FetchHandle {
        self.search_query.send_replace(query.to_string());

        let mut fetch = self.lock_fetch();
        fetch.reset();
        self.ui_state.send_replace(UiState::Loading);

        let request = FetchRequest::Search(self.search_request(query, api_key, fetch.page));
        self.spawn_fetch(&mut fetch, request)
    }

    /// Forget the active search query and reload the selected category
    pub fn clear_search(self: &Arc<Self>) -> FetchHandle {
        self.search_query.send_replace(String::new());

        let mut fetch = self.lock_fetch();
        fetch.reset();
        self.dispatch_page(&mut fetch, &self.api_key)
    }

    // ========================
    // Filters
    // ========================

    /// Select a category and reload from the first page
    pub fn set_category(self: &Arc<Self>, category: Category) -> FetchHandle {
        self.selected_category.send_replace(category);

        let mut fetch = self.lock_fetch();
        fetch.reset();
        self.dispatch_page(&mut fetch, &self.api_key)
    }

    /// Select a sort order. Reloads from the first page unless a search
    /// query is active, in which case only the cursor is reset and a later
    /// page still in flight is cancelled.
    pub fn set_sort_by(self: &Arc<Self>, sort_by: SortBy) -> Option<FetchHandle> {
        self.selected_sort_by.send_replace(sort_by);
        let query_active = !self.search_query.borrow().trim().is_empty();

        let mut fetch = self.lock_fetch();
        if query_active {
            // A first-page fetch in flight already targets the reset cursor
            if !(fetch.is_in_flight() && fetch.page == FIRST_PAGE) {
                fetch.reset();
            }
            return None;
        }
        fetch.reset();
        Some(self.dispatch_page(&mut fetch, &self.api_key))
    }

    // ========================
    // Favorites
    // ========================

    /// Add `article` to the favorites if absent, remove it otherwise.
    /// Observers receive a fresh set either way.
    pub fn toggle_favorite(&self, article: &Article) {
        self.favorites.send_modify(|favorites| *favorites = favorites.toggled(article));
    }

    pub fn is_favorite(&self, article: &Article) -> bool {
        self.favorites.borrow().contains(article)
    }

    // ========================
    // Internals
    // ========================

    fn search_request(&self, query: &str, api_key: &str, page: u32) -> SearchRequest {
        SearchRequest::new(query, api_key)
            .sort_by(*self.selected_sort_by.borrow())
            .page_size(self.page_size)
            .language(self.language.as_str())
            .page(page)
    }

    /// Build the page request for the selected category and start it
    fn dispatch_page(self: &Arc<Self>, fetch: &mut FetchState, api_key: &str) -> FetchHandle {
        if fetch.page == FIRST_PAGE {
            self.ui_state.send_replace(UiState::Loading);
        }

        let category = *self.selected_category.borrow();
        let request = if category == Category::All {
            FetchRequest::Headlines(
                HeadlinesRequest::new(api_key)
                    .page_size(self.page_size)
                    .language(self.language.as_str())
                    .page(fetch.page),
            )
        } else {
            FetchRequest::Search(self.search_request(category.query(), api_key, fetch.page))
        };

        self.spawn_fetch(fetch, request)
    }

    fn spawn_fetch(self: &Arc<Self>, fetch: &mut FetchState, request: FetchRequest) -> FetchHandle {
        let generation = fetch.generation;
        let page = fetch.page;
        tracing::info!(
            endpoint = request.endpoint(),
            query = ?request.query(),
            page,
            generation,
            "Dispatching news fetch"
        );

        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = controller.api.fetch(&request).await;
            controller.apply_result(generation, page, result);
        });
        fetch.task = Some(handle.abort_handle());
        handle
    }

    fn apply_result(&self, generation: u64, page: u32, result: Result<NewsResponse, NewsError>) {
        let mut fetch = self.lock_fetch();
        if fetch.generation != generation {
            tracing::debug!(generation, current = fetch.generation, "Dropping stale fetch result");
            return;
        }
        // Free the slot before publishing so observers can fetch again
        fetch.task = None;

        match result {
            Ok(response) => {
                let received = response.articles.len();
                let articles = if page == FIRST_PAGE {
                    response.articles
                } else {
                    let mut merged = self
                        .ui_state
                        .borrow()
                        .articles()
                        .map(<[Article]>::to_vec)
                        .unwrap_or_default();
                    merged.extend(response.articles);
                    merged
                };

                fetch.has_more = received > 0;
                fetch.page = page + 1;
                tracing::info!(page, received, total = articles.len(), "News fetch completed");
                self.ui_state.send_replace(UiState::Success(articles));
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "News fetch failed");
                self.ui_state.send_replace(UiState::Error(e.user_message()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_article;
    use crate::network::mock::MockNewsApi;

    fn controller(api: &Arc<MockNewsApi>) -> Arc<NewsController> {
        Arc::new(NewsController::new(api.clone(), "test-key"))
    }

    fn articles(range: std::ops::RangeInclusive<u32>) -> Vec<Article> {
        range.map(sample_article).collect()
    }

    #[tokio::test]
    async fn test_initial_state() {
        let api = Arc::new(MockNewsApi::new());
        let news = controller(&api);

        assert_eq!(news.current_ui_state(), UiState::Loading);
        assert_eq!(*news.selected_category().borrow(), Category::Technology);
        assert_eq!(*news.selected_sort_by().borrow(), SortBy::PublishedAt);
        assert_eq!(*news.search_query().borrow(), "");
        assert!(news.favorites().borrow().is_empty());
        assert_eq!(news.current_page(), 1);
        assert!(news.has_more_pages());
        assert!(!news.is_fetching());
    }

    #[tokio::test]
    async fn test_load_news_searches_selected_category() {
        let api = Arc::new(MockNewsApi::new());
        api.push_articles(articles(1..=2));
        let news = controller(&api);

        news.load_news("k").unwrap().await.unwrap();

        assert_eq!(
            api.calls(),
            vec![FetchRequest::Search(SearchRequest::new("technology", "k"))]
        );
        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=2)));
        assert_eq!(news.current_page(), 2);
        assert!(news.has_more_pages());
        assert!(!news.is_fetching());
    }

    #[tokio::test]
    async fn test_all_category_uses_top_headlines() {
        let api = Arc::new(MockNewsApi::new());
        api.push_articles(articles(1..=1));
        let news = controller(&api);

        news.set_category(Category::All).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![FetchRequest::Headlines(HeadlinesRequest::new("test-key"))]
        );
        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=1)));
    }

    #[tokio::test]
    async fn test_load_news_while_in_flight_is_noop() {
        let api = Arc::new(MockNewsApi::gated());
        let news = controller(&api);

        let first = news.load_news("k").unwrap();
        assert!(news.is_fetching());
        assert!(news.load_news("k").is_none());
        assert!(news.load_more_news("k").is_none());
        assert_eq!(news.current_ui_state(), UiState::Loading);

        api.release(1);
        first.await.unwrap();
        assert_eq!(api.calls().len(), 1);
        assert!(!news.is_fetching());
    }

    #[tokio::test]
    async fn test_load_more_appends_in_order() {
        let api = Arc::new(MockNewsApi::new());
        api.push_articles(articles(1..=2));
        api.push_articles(articles(3..=4));
        let news = controller(&api);

        news.load_news("k").unwrap().await.unwrap();
        let more = news.load_more_news("k").unwrap();
        // Past the first page the current list stays visible
        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=2)));
        more.await.unwrap();

        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=4)));
        assert_eq!(news.current_page(), 3);
        match &api.calls()[1] {
            FetchRequest::Search(req) => assert_eq!(req.page, Some(2)),
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_are_kept() {
        let api = Arc::new(MockNewsApi::new());
        api.push_articles(articles(1..=2));
        api.push_articles(articles(1..=2));
        let news = controller(&api);

        news.load_news("k").unwrap().await.unwrap();
        news.load_more_news("k").unwrap().await.unwrap();

        let state = news.current_ui_state();
        assert_eq!(state.articles().map(<[Article]>::len), Some(4));
    }

    #[tokio::test]
    async fn test_empty_page_stops_pagination() {
        let api = Arc::new(MockNewsApi::new());
        api.push_articles(articles(1..=1));
        api.push_articles(Vec::new());
        let news = controller(&api);

        news.load_news("k").unwrap().await.unwrap();
        news.load_more_news("k").unwrap().await.unwrap();

        assert!(!news.has_more_pages());
        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=1)));
        assert!(news.load_more_news("k").is_none());
        assert_eq!(api.calls().len(), 2);

        // A new category makes more pages possible again
        api.push_articles(articles(5..=5));
        news.set_category(Category::Science).await.unwrap();
        assert!(news.has_more_pages());
    }

    #[tokio::test]
    async fn test_set_category_issues_one_fetch_from_first_page() {
        let api = Arc::new(MockNewsApi::new());
        let news = controller(&api);

        api.push_articles(articles(1..=1));
        news.load_news("k").unwrap().await.unwrap();
        assert_eq!(news.current_page(), 2);

        let sequence = [Category::AI, Category::Business, Category::AI, Category::Science];
        for (i, category) in sequence.into_iter().enumerate() {
            api.push_articles(articles(10..=11));
            let handle = news.set_category(category);
            assert_eq!(news.current_page(), 1);
            assert_eq!(news.current_ui_state(), UiState::Loading);
            handle.await.unwrap();

            let calls = api.calls();
            assert_eq!(calls.len(), i + 2);
            let expected = SearchRequest::new(category.query(), "test-key");
            assert_eq!(calls.last(), Some(&FetchRequest::Search(expected)));
            assert_eq!(news.current_ui_state(), UiState::Success(articles(10..=11)));
        }
    }

    #[tokio::test]
    async fn test_set_category_cancels_outstanding_fetch() {
        let api = Arc::new(MockNewsApi::gated());
        let news = controller(&api);

        let first = news.load_news("k").unwrap();
        tokio::task::yield_now().await;
        assert_eq!(api.calls().len(), 1);

        api.push_articles(articles(7..=8));
        let second = news.set_category(Category::AI);
        tokio::task::yield_now().await;
        api.release(1);

        second.await.unwrap();
        assert!(first.await.unwrap_err().is_cancelled());
        assert_eq!(api.calls().len(), 2);
        assert_eq!(news.current_ui_state(), UiState::Success(articles(7..=8)));
        assert_eq!(*news.selected_category().borrow(), Category::AI);
    }

    #[tokio::test]
    async fn test_set_sort_by_reloads_without_query() {
        let api = Arc::new(MockNewsApi::new());
        let news = controller(&api);

        news.set_sort_by(SortBy::Popularity).unwrap().await.unwrap();

        let expected = SearchRequest::new("technology", "test-key").sort_by(SortBy::Popularity);
        assert_eq!(api.calls(), vec![FetchRequest::Search(expected)]);
        assert_eq!(*news.selected_sort_by().borrow(), SortBy::Popularity);
    }

    #[tokio::test]
    async fn test_set_sort_by_with_active_query_only_resets_cursor() {
        let api = Arc::new(MockNewsApi::new());
        api.push_articles(articles(1..=3));
        let news = controller(&api);

        news.search_news("rust", "k").await.unwrap();
        assert_eq!(news.current_page(), 2);

        assert!(news.set_sort_by(SortBy::Relevancy).is_none());
        assert_eq!(api.calls().len(), 1);
        assert_eq!(news.current_page(), 1);
        assert!(news.has_more_pages());
        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=3)));
    }

    #[tokio::test]
    async fn test_search_replaces_list() {
        let api = Arc::new(MockNewsApi::new());
        api.push_articles(articles(1..=2));
        api.push_articles(articles(3..=3));
        let news = controller(&api);

        news.load_news("k").unwrap().await.unwrap();
        let handle = news.search_news("rust", "k");
        assert_eq!(news.current_ui_state(), UiState::Loading);
        handle.await.unwrap();

        assert_eq!(news.current_ui_state(), UiState::Success(articles(3..=3)));
        assert_eq!(*news.search_query().borrow(), "rust");
        assert_eq!(news.current_page(), 2);
        assert_eq!(
            api.calls()[1],
            FetchRequest::Search(SearchRequest::new("rust", "k"))
        );
    }

    #[tokio::test]
    async fn test_search_is_not_blocked_by_in_flight_fetch() {
        let api = Arc::new(MockNewsApi::gated());
        let news = controller(&api);

        let load = news.load_news("k").unwrap();
        let search = news.search_news("quantum", "k");
        api.release(1);
        search.await.unwrap();

        assert!(load.await.unwrap_err().is_cancelled());
        assert_eq!(
            api.calls(),
            vec![FetchRequest::Search(SearchRequest::new("quantum", "k"))]
        );
    }

    #[tokio::test]
    async fn test_clear_search_reloads_category() {
        let api = Arc::new(MockNewsApi::new());
        let news = controller(&api);

        news.search_news("rust", "k").await.unwrap();
        news.clear_search().await.unwrap();

        assert_eq!(*news.search_query().borrow(), "");
        assert_eq!(
            api.calls()[1],
            FetchRequest::Search(SearchRequest::new("technology", "test-key"))
        );
    }

    #[tokio::test]
    async fn test_transport_error_message() {
        let api = Arc::new(MockNewsApi::new());
        api.push_error(NewsError::Network("timeout".to_string()));
        let news = controller(&api);

        news.load_news("k").unwrap().await.unwrap();

        assert_eq!(news.current_ui_state(), UiState::Error("timeout".to_string()));
        assert_eq!(news.current_page(), 1);
        assert!(!news.is_fetching());
    }

    #[tokio::test]
    async fn test_error_without_message_falls_back() {
        let api = Arc::new(MockNewsApi::new());
        api.push_error(NewsError::Network(String::new()));
        api.push_error(NewsError::Unknown);
        let news = controller(&api);

        news.load_news("k").unwrap().await.unwrap();
        assert_eq!(
            news.current_ui_state(),
            UiState::Error("Unknown error occurred".to_string())
        );

        news.search_news("rust", "k").await.unwrap();
        assert_eq!(
            news.current_ui_state(),
            UiState::Error("Unknown error occurred".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_page_keeps_cursor_and_retry_works() {
        let api = Arc::new(MockNewsApi::new());
        api.push_articles(articles(1..=1));
        api.push_error(NewsError::Api {
            status: Some(429),
            message: "rate limited".to_string(),
        });
        api.push_articles(articles(2..=2));
        let news = controller(&api);

        news.load_news("k").unwrap().await.unwrap();
        news.load_more_news("k").unwrap().await.unwrap();
        assert_eq!(news.current_ui_state(), UiState::Error("rate limited".to_string()));
        assert_eq!(news.current_page(), 2);

        // Error -> Loading on the next page-1 action
        let handle = news.set_category(Category::Business);
        assert_eq!(news.current_ui_state(), UiState::Loading);
        handle.await.unwrap();
        assert_eq!(news.current_ui_state(), UiState::Success(articles(2..=2)));
    }

    #[tokio::test]
    async fn test_toggle_favorite_round_trip() {
        let api = Arc::new(MockNewsApi::new());
        let news = controller(&api);
        let mut favorites = news.favorites();
        let article = sample_article(1);

        assert!(!news.is_favorite(&article));
        news.toggle_favorite(&article);
        assert!(favorites.has_changed().unwrap());
        assert!(news.is_favorite(&article));
        assert_eq!(favorites.borrow_and_update().len(), 1);

        news.toggle_favorite(&article);
        assert!(favorites.has_changed().unwrap());
        assert!(!news.is_favorite(&article));
        assert!(favorites.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_page_size_and_language_overrides() {
        let api = Arc::new(MockNewsApi::new());
        let news = Arc::new(
            NewsController::new(api.clone(), "test-key")
                .with_page_size(50)
                .with_language("de"),
        );

        news.load_news("k").unwrap().await.unwrap();

        let expected = SearchRequest::new("technology", "k").page_size(50).language("de");
        assert_eq!(api.calls(), vec![FetchRequest::Search(expected)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slot_is_free_once_result_is_published() {
        for _ in 0..200 {
            let api = Arc::new(MockNewsApi::new());
            api.push_articles(articles(1..=1));
            let news = controller(&api);
            let mut state = news.ui_state();

            let first = news.load_news("k").unwrap();
            state
                .wait_for(|s| matches!(s, UiState::Success(_)))
                .await
                .unwrap();
            let more = news.load_more_news("k");
            assert!(more.is_some(), "finished fetch still occupied the slot");

            first.await.unwrap();
            more.unwrap().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_result_from_superseded_generation_is_dropped() {
        let api = Arc::new(MockNewsApi::new());
        api.push_articles(articles(1..=2));
        let news = controller(&api);
        news.load_news("k").unwrap().await.unwrap();

        // Pagination restarts after the response arrives but before it is applied
        let weak = Arc::downgrade(&news);
        api.on_response(move || {
            if let Some(news) = weak.upgrade() {
                news.lock_fetch().generation += 1;
            }
        });

        api.push_articles(articles(3..=4));
        news.load_more_news("k").unwrap().await.unwrap();
        assert_eq!(api.calls().len(), 2);
        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=2)));
        assert_eq!(news.current_page(), 2);
        assert!(news.has_more_pages());

        api.push_error(NewsError::Network("offline".to_string()));
        news.load_more_news("k").unwrap().await.unwrap();
        assert_eq!(api.calls().len(), 3);
        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=2)));
        assert_eq!(news.current_page(), 2);
    }

    #[tokio::test]
    async fn test_set_sort_by_with_active_query_cancels_later_page() {
        let api = Arc::new(MockNewsApi::gated());
        let news = controller(&api);

        api.push_articles(articles(1..=2));
        let search = news.search_news("rust", "k");
        api.release(1);
        search.await.unwrap();

        let more = news.load_more_news("k").unwrap();
        tokio::task::yield_now().await;
        assert_eq!(api.calls().len(), 2);

        assert!(news.set_sort_by(SortBy::Relevancy).is_none());
        api.push_articles(articles(3..=4));
        api.release(1);

        assert!(more.await.unwrap_err().is_cancelled());
        assert!(!news.is_fetching());
        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=2)));
        assert_eq!(news.current_page(), 1);
        assert!(news.has_more_pages());
    }

    #[tokio::test]
    async fn test_set_sort_by_with_active_query_keeps_first_page_fetch() {
        let api = Arc::new(MockNewsApi::gated());
        let news = controller(&api);

        api.push_articles(articles(1..=2));
        let search = news.search_news("rust", "k");
        assert!(news.set_sort_by(SortBy::Popularity).is_none());
        assert_eq!(news.current_ui_state(), UiState::Loading);

        api.release(1);
        search.await.unwrap();
        assert_eq!(news.current_ui_state(), UiState::Success(articles(1..=2)));
        assert_eq!(news.current_page(), 2);
        assert_eq!(api.calls().len(), 1);
    }
}
