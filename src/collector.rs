//! Collector Layer
//!
//! Collector units that each poll one endpoint of the monitored node's
//! status API and normalize the JSON document into metric samples. One
//! Tokio task per collector is fanned out on every poll; the shared
//! [`MetricSink`] accumulates samples until the orchestrator joins all
//! tasks and drains it.
//!
//! # Architecture
//!
//! - [`Collector`]: contract for one diagnostic family
//! - [`CollectorRegistry`]: immutable name → collector map
//! - [`fetch_json`]: the single fetch+decode helper behind every variant
//! - variants: [`NodeInfoCollector`], [`NodeStatsCollector`],
//!   [`HotThreadsCollector`]

mod fetch;
pub mod hot_threads;
pub mod node_info;
pub mod node_stats;
mod registry;
mod sample;
mod traits;

pub use fetch::fetch_json;
pub use hot_threads::HotThreadsCollector;
pub use node_info::NodeInfoCollector;
pub use node_stats::NodeStatsCollector;
pub use registry::CollectorRegistry;
pub use sample::{MetricKind, MetricSample, MetricSink};
pub use traits::{Collector, ScrapeError};
