//! Scrape orchestration.
//!
//! On each poll the orchestrator fans out one Tokio task per registered
//! collector, bounds every task with the poll deadline, joins them all
//! (no partial results) and records one duration observation per
//! collector labeled with its outcome.

use std::sync::Arc;
use std::time::{Duration, Instant};

use prometheus::{HistogramOpts, HistogramVec, Registry};
use tokio::time::timeout;

use crate::StartupError;
use crate::collector::{CollectorRegistry, MetricSample, MetricSink, ScrapeError};

/// Outcome of one collector invocation within one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Success,
    Error,
}

impl ScrapeOutcome {
    /// Value of the `result` label on the duration metric.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Per-collector record of one poll. Produced exactly once per collector
/// per poll, however the collector fared.
#[derive(Debug)]
pub struct ScrapeResult {
    pub collector: String,
    pub elapsed: Duration,
    pub outcome: ScrapeOutcome,
}

/// Everything one poll produced: the merged sample set and one result per
/// registered collector.
#[derive(Debug)]
pub struct ScrapeSummary {
    pub samples: Vec<MetricSample>,
    pub results: Vec<ScrapeResult>,
}

/// Fans out collector tasks per poll and aggregates their output.
pub struct ScrapeOrchestrator {
    registry: Arc<CollectorRegistry>,
    durations: HistogramVec,
    deadline: Duration,
}

impl ScrapeOrchestrator {
    /// Create an orchestrator over an immutable collector registry.
    ///
    /// The scrape duration metric is registered into the injected
    /// `metrics_registry`; there is no global metric state.
    pub fn new(
        registry: Arc<CollectorRegistry>,
        metrics_registry: &Registry,
        deadline: Duration,
    ) -> Result<Self, StartupError> {
        let durations = HistogramVec::new(
            HistogramOpts::new(
                "logstash_exporter_scrape_duration_seconds",
                "Duration of a collector scrape.",
            ),
            &["collector", "result"],
        )?;
        metrics_registry.register(Box::new(durations.clone()))?;

        Ok(Self {
            registry,
            durations,
            deadline,
        })
    }

    /// Run one full poll.
    ///
    /// Every collector runs concurrently against a shared sink; a single
    /// collector's error, timeout or panic never cancels or delays the
    /// others. The returned summary always carries exactly one
    /// [`ScrapeResult`] per registered collector.
    pub async fn scrape(&self) -> ScrapeSummary {
        let sink = Arc::new(MetricSink::new());
        let poll_start = Instant::now();

        let mut tasks = Vec::with_capacity(self.registry.len());
        for collector in self.registry.iter() {
            let collector = Arc::clone(collector);
            let sink = Arc::clone(&sink);
            let deadline = self.deadline;
            let name = collector.name().to_string();

            let handle = tokio::spawn(async move {
                let start = Instant::now();
                let outcome = match timeout(deadline, collector.collect(&sink)).await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(err)) => Err(err),
                    // The timeout drops the collect future, cancelling the
                    // in-flight fetch.
                    Err(_) => Err(ScrapeError::Deadline(deadline)),
                };
                (start.elapsed(), outcome)
            });
            tasks.push((name, handle));
        }

        // Barrier: all per-collector results exist before the exposition
        // is built.
        let mut results = Vec::with_capacity(tasks.len());
        for (name, handle) in tasks {
            let (elapsed, outcome) = match handle.await {
                Ok(result) => result,
                Err(err) => (
                    poll_start.elapsed(),
                    Err(ScrapeError::Task(err.to_string())),
                ),
            };
            results.push(self.record(name, elapsed, outcome));
        }

        ScrapeSummary {
            samples: sink.drain(),
            results,
        }
    }

    fn record(
        &self,
        collector: String,
        elapsed: Duration,
        outcome: Result<(), ScrapeError>,
    ) -> ScrapeResult {
        let outcome = match outcome {
            Ok(()) => {
                tracing::debug!(
                    collector = %collector,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "collector succeeded"
                );
                ScrapeOutcome::Success
            }
            Err(err) => {
                tracing::warn!(
                    collector = %collector,
                    class = err.class(),
                    error = %err,
                    "collector failed"
                );
                ScrapeOutcome::Error
            }
        };

        self.durations
            .with_label_values(&[&collector, outcome.as_str()])
            .observe(elapsed.as_secs_f64());

        ScrapeResult {
            collector,
            elapsed,
            outcome,
        }
    }
}
