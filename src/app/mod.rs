//! App layer - the news state controller and the actor driving it
//!
//! [`NewsController`] owns the list state, filters, favorites and pagination.
//! [`AppActor`] receives UI events, calls the controller and emits render
//! state.

pub mod state;
pub mod actor;
pub mod commands;

pub use state::{FetchHandle, NewsController, UiState};
pub use actor::AppActor;
