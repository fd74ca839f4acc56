//! Core collector contract and per-collector error types.

use std::time::Duration;

use thiserror::Error;

use crate::collector::MetricSink;

/// Errors that can occur during one collector invocation.
///
/// These are per-poll and non-fatal: the orchestrator records them as a
/// labeled duration observation plus a log line and the poll completes.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport failure: connection refused, timeout, non-2xx status.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was malformed or had an unexpected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The per-poll deadline elapsed before the collector finished.
    #[error("deadline of {0:?} exceeded")]
    Deadline(Duration),

    /// The collector task failed to complete.
    #[error("collector task failed: {0}")]
    Task(String),
}

impl ScrapeError {
    /// Short class tag used in log lines.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
            Self::Deadline(_) => "deadline",
            Self::Task(_) => "task",
        }
    }
}

/// A unit responsible for producing one family of related metrics from
/// one endpoint of the monitored node's status API.
///
/// Collectors are stateless across polls except their pre-built endpoint
/// URL and HTTP client. `collect` must emit zero or more samples into the
/// shared sink and return `Ok`, or return a descriptive error and emit
/// nothing further for that invocation. A collector must not hold
/// process-wide state that other collectors can observe or mutate.
#[async_trait::async_trait]
pub trait Collector: Send + Sync + 'static {
    /// Unique name of this collector. Doubles as the `collector` label on
    /// the scrape duration metric.
    fn name(&self) -> &str;

    /// Perform one collection cycle against the shared sink.
    async fn collect(&self, sink: &MetricSink) -> Result<(), ScrapeError>;
}
