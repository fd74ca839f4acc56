//! Logstash exporter library.
//!
//! A pull-based Prometheus exporter for a Logstash node. Every scrape of
//! the exporter's `/metrics` endpoint polls the node's HTTP status API
//! (one concurrent fetch per registered collector), normalizes the JSON
//! documents into a uniform sample model and returns a single text-format
//! exposition.
//!
//! # Architecture
//!
//! - **Collectors**: one unit per diagnostic family (node info, node
//!   stats, hot threads), each owning its endpoint and response schema
//! - **Scrape orchestrator**: per-poll fan-out with a bounded deadline,
//!   error isolation and per-collector duration observations
//! - **Exposition**: sample-to-text encoding via the Prometheus registry
//! - **Server**: the `/metrics` pull endpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use logstash_exporter::{CollectorRegistry, HotThreadsCollector, ScrapeOrchestrator};
//!
//! # async fn run() -> Result<(), logstash_exporter::StartupError> {
//! let client = reqwest::Client::new();
//! let registry = Arc::new(CollectorRegistry::new(vec![Arc::new(
//!     HotThreadsCollector::new("http://localhost:9600", client)?,
//! )])?);
//! let metrics_registry = prometheus::Registry::new();
//! let orchestrator =
//!     ScrapeOrchestrator::new(registry, &metrics_registry, Duration::from_secs(10))?;
//! let summary = orchestrator.scrape().await;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
mod error;
pub mod exposition;
pub mod scrape;
pub mod server;

pub use collector::{
    Collector, CollectorRegistry, HotThreadsCollector, MetricKind, MetricSample, MetricSink,
    NodeInfoCollector, NodeStatsCollector, ScrapeError,
};
pub use config::{AppConfig, ConfigError};
pub use error::StartupError;
pub use scrape::{ScrapeOrchestrator, ScrapeOutcome, ScrapeResult, ScrapeSummary};
