//! # technews
//!
//! A headless tech news client for NewsAPI-compatible services.
//!
//! ## Features
//! - Top headlines and category search (Technology, AI, Business, Science)
//! - Sorting by date, popularity or relevancy
//! - Free-text search
//! - Pagination with a single outstanding fetch
//! - Favorites
//! - Persisted dark/light theme flag
//!
//! ## Architecture
//! Actor-based with channels:
//! - Input Layer - line commands from stdin
//! - App Layer - [`NewsController`] state plus the [`AppActor`] loop
//! - Network Layer - [`NewsApi`] over reqwest

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;

// Re-export commonly used types
pub use app::{AppActor, FetchHandle, NewsController, UiState};
pub use config::AppConfig;
pub use error::{ConfigError, NewsError, StorageError};
pub use messages::{line_to_ui_event, RenderState, UiEvent, View};
pub use models::{Article, Category, FavoriteSet, NewsResponse, SortBy, Source};
pub use network::{HeadlinesRequest, NewsApi, ReqwestNewsClient, SearchRequest};
pub use storage::PreferenceStore;
