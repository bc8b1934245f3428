//! Error types for the crawl engine

use thiserror::Error;

/// Errors that stop a crawl from starting or abort it as a whole.
///
/// Per-page problems never show up here; they are logged and skipped.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Parameters rejected before the run started
    #[error("invalid crawl parameters: {0}")]
    InvalidParameters(String),

    /// `start` was called while a crawl is still running on this engine
    #[error("a crawl is already running")]
    AlreadyRunning,

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}
