//! Message types for inter-layer communication in the actor-based architecture.
//!
//! Input lines become [`UiEvent`]s for the App actor; the actor answers with
//! [`RenderState`] snapshots.

pub mod ui_events;
pub mod render;

pub use ui_events::{line_to_ui_event, UiEvent, View};
pub use render::RenderState;
