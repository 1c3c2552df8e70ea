//! Network layer - news API contract and its HTTP implementation
//!
//! The controller talks to [`NewsApi`]; [`ReqwestNewsClient`] is the
//! production implementation.

pub mod api;
pub mod client;
#[cfg(test)]
pub(crate) mod mock;

pub use api::{FetchRequest, HeadlinesRequest, NewsApi, SearchRequest};
pub use client::ReqwestNewsClient;
