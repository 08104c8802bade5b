//! Wiki Backend Module
//!
//! The external content collaborator the mediator falls back to on cache
//! misses. Calls have unbounded latency and no retry semantics of their own.

mod wikipedia;

pub use wikipedia::WikipediaBackend;

use async_trait::async_trait;
use thiserror::Error;

// == Backend Error ==
/// Error raised by the wiki backend. Carries the underlying error text,
/// which the dispatcher surfaces verbatim in failed responses.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct BackendError(pub String);

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError(err.to_string())
    }
}

impl From<BackendError> for crate::error::WikiError {
    fn from(err: BackendError) -> Self {
        crate::error::WikiError::Backend(err.0)
    }
}

/// Convenience Result type for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

// == Wiki Backend Trait ==
/// The queries the mediator needs from a wiki.
///
/// Implemented by [`WikipediaBackend`] in production and by counting or
/// scripted mocks in tests.
#[async_trait]
pub trait WikiBackend: Send + Sync {
    /// Page titles matching a free-text query, up to `limit`.
    async fn search(&self, query: &str, limit: usize) -> BackendResult<Vec<String>>;

    /// Full text of the page with the given title. Empty string if the
    /// title matches no page.
    async fn page_text(&self, title: &str) -> BackendResult<String>;

    /// Titles of the pages linked from the given page.
    async fn links_on_page(&self, title: &str) -> BackendResult<Vec<String>>;

    /// Titles of the pages belonging to a category.
    async fn category_members(&self, category: &str) -> BackendResult<Vec<String>>;

    /// Username of the most recent editor of a page.
    async fn last_editor(&self, title: &str) -> BackendResult<String>;

    /// Names of the categories a page belongs to.
    async fn categories_on_page(&self, title: &str) -> BackendResult<Vec<String>>;

    /// Titles of the pages an author has contributed to.
    async fn contributions(&self, author: &str) -> BackendResult<Vec<String>>;
}
