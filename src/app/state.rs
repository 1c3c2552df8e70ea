//! Controller state - observable values, pagination and the fetch slot

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use crate::constants::{DEFAULT_LANGUAGE, DEFAULT_PAGE_SIZE, FIRST_PAGE};
use crate::models::{Article, Category, FavoriteSet, SortBy};
use crate::network::NewsApi;

/// What the presentation layer should show for the article list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UiState {
    #[default]
    Loading,
    Success(Vec<Article>),
    Error(String),
}

impl UiState {
    pub fn articles(&self) -> Option<&[Article]> {
        match self {
            UiState::Success(articles) => Some(articles),
            _ => None,
        }
    }
}

/// Handle of a dispatched fetch. Awaiting it yields `Err` if the fetch was
/// cancelled by a newer one.
pub type FetchHandle = JoinHandle<()>;

/// Pagination cursor plus the single outstanding fetch
#[derive(Debug)]
pub(crate) struct FetchState {
    pub page: u32,
    pub has_more: bool,
    /// Bumped whenever pagination is reset; results from an older
    /// generation are dropped
    pub generation: u64,
    pub task: Option<AbortHandle>,
}

impl FetchState {
    fn new() -> Self {
        FetchState {
            page: FIRST_PAGE,
            has_more: true,
            generation: 0,
            task: None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Abort the outstanding fetch and restart pagination
    pub fn reset(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        self.page = FIRST_PAGE;
        self.has_more = true;
    }
}

/// Application state controller.
///
/// Holds the list state, filters, search query, favorites and pagination, and
/// runs fetches against a [`NewsApi`]. Every observable value is a
/// `tokio::sync::watch` channel, so new subscribers see the current value
/// immediately.
///
/// Operations that hit the network spawn a tokio task and must be called from
/// within a runtime; the controller is shared as `Arc<NewsController>`.
pub struct NewsController {
    pub(crate) api: Arc<dyn NewsApi>,
    pub(crate) api_key: String,
    pub(crate) page_size: u32,
    pub(crate) language: String,

    pub(crate) ui_state: watch::Sender<UiState>,
    pub(crate) search_query: watch::Sender<String>,
    pub(crate) selected_category: watch::Sender<Category>,
    pub(crate) selected_sort_by: watch::Sender<SortBy>,
    pub(crate) favorites: watch::Sender<FavoriteSet>,

    pub(crate) fetch: Mutex<FetchState>,
}

impl NewsController {
    /// `api_key` is used by the operations that fetch on their own
    /// (category and sort changes)
    pub fn new(api: Arc<dyn NewsApi>, api_key: impl Into<String>) -> Self {
        NewsController {
            api,
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
            language: DEFAULT_LANGUAGE.to_string(),
            ui_state: watch::Sender::new(UiState::Loading),
            search_query: watch::Sender::new(String::new()),
            selected_category: watch::Sender::new(Category::default()),
            selected_sort_by: watch::Sender::new(SortBy::default()),
            favorites: watch::Sender::new(FavoriteSet::new()),
            fetch: Mutex::new(FetchState::new()),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    // ========================
    // Observables
    // ========================

    pub fn ui_state(&self) -> watch::Receiver<UiState> {
        self.ui_state.subscribe()
    }

    pub fn search_query(&self) -> watch::Receiver<String> {
        self.search_query.subscribe()
    }

    pub fn selected_category(&self) -> watch::Receiver<Category> {
        self.selected_category.subscribe()
    }

    pub fn selected_sort_by(&self) -> watch::Receiver<SortBy> {
        self.selected_sort_by.subscribe()
    }

    pub fn favorites(&self) -> watch::Receiver<FavoriteSet> {
        self.favorites.subscribe()
    }

    // ========================
    // Snapshots
    // ========================

    pub fn current_ui_state(&self) -> UiState {
        self.ui_state.borrow().clone()
    }

    pub fn current_page(&self) -> u32 {
        self.lock_fetch().page
    }

    pub fn has_more_pages(&self) -> bool {
        self.lock_fetch().has_more
    }

    pub fn is_fetching(&self) -> bool {
        self.lock_fetch().is_in_flight()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn lock_fetch(&self) -> MutexGuard<'_, FetchState> {
        self.fetch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
