//! Fatal startup error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Unrecoverable startup conditions.
///
/// Any of these halts the process before serving begins. Per-poll failures
/// are never represented here; they surface as [`crate::ScrapeError`].
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration could not be loaded or validated.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A collector endpoint could not be constructed from the base URL.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// Two collectors were registered under the same name.
    #[error("duplicate collector name: {0}")]
    DuplicateCollector(String),

    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),

    /// A metric could not be registered with the exposition registry.
    #[error("metrics registration error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// The listener could not be bound.
    #[error("bind error: {0}")]
    Bind(#[from] std::io::Error),
}
