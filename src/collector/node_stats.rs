//! Runtime node statistics collector.
//!
//! Polls `/_node/stats` and emits JVM, process and event-flow metrics.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::StartupError;
use crate::collector::{Collector, MetricSample, MetricSink, ScrapeError, fetch_json};

/// Build the node-stats endpoint for a base node URL.
pub fn node_stats_endpoint(base: &str) -> Result<String, url::ParseError> {
    let url = Url::parse(&format!("{}/_node/stats", base.trim_end_matches('/')))?;
    Ok(url.to_string())
}

/// Response of the node-stats API, reduced to the sections this collector
/// exports.
#[derive(Debug, Deserialize)]
pub struct NodeStatsResponse {
    pub jvm: JvmStats,
    pub process: ProcessStats,
    pub events: EventStats,
}

#[derive(Debug, Deserialize)]
pub struct JvmStats {
    pub threads: JvmThreads,
    pub mem: JvmMem,
}

#[derive(Debug, Deserialize)]
pub struct JvmThreads {
    pub count: i64,
    pub peak_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct JvmMem {
    pub heap_used_bytes: i64,
    pub heap_max_bytes: i64,
}

#[derive(Debug, Deserialize)]
pub struct ProcessStats {
    pub open_file_descriptors: i64,
    pub max_file_descriptors: i64,
    pub cpu: ProcessCpu,
}

#[derive(Debug, Deserialize)]
pub struct ProcessCpu {
    pub percent: f64,
}

#[derive(Debug, Deserialize)]
pub struct EventStats {
    #[serde(rename = "in")]
    pub events_in: i64,
    pub filtered: i64,
    pub out: i64,
    pub duration_in_millis: i64,
}

/// Collector for runtime node statistics.
pub struct NodeStatsCollector {
    endpoint: String,
    client: Client,
}

impl NodeStatsCollector {
    /// Registry name of this collector.
    pub const NAME: &'static str = "node";

    /// Create the collector, caching the fully built endpoint.
    pub fn new(base_endpoint: &str, client: Client) -> Result<Self, StartupError> {
        Ok(Self {
            endpoint: node_stats_endpoint(base_endpoint)?,
            client,
        })
    }
}

#[async_trait::async_trait]
impl Collector for NodeStatsCollector {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn collect(&self, sink: &MetricSink) -> Result<(), ScrapeError> {
        let response: NodeStatsResponse = fetch_json(&self.client, &self.endpoint).await?;
        sink.emit_all(samples_from(&response));
        Ok(())
    }
}

fn samples_from(response: &NodeStatsResponse) -> Vec<MetricSample> {
    vec![
        MetricSample::gauge(
            "logstash_node_jvm_threads_count",
            "Current JVM thread count.",
            response.jvm.threads.count as f64,
        ),
        MetricSample::gauge(
            "logstash_node_jvm_threads_peak_count",
            "Peak JVM thread count.",
            response.jvm.threads.peak_count as f64,
        ),
        MetricSample::gauge(
            "logstash_node_jvm_mem_heap_used_bytes",
            "JVM heap memory in use.",
            response.jvm.mem.heap_used_bytes as f64,
        ),
        MetricSample::gauge(
            "logstash_node_jvm_mem_heap_max_bytes",
            "Maximum JVM heap memory.",
            response.jvm.mem.heap_max_bytes as f64,
        ),
        MetricSample::gauge(
            "logstash_node_process_open_file_descriptors",
            "Open file descriptors of the node process.",
            response.process.open_file_descriptors as f64,
        ),
        MetricSample::gauge(
            "logstash_node_process_max_file_descriptors",
            "File descriptor limit of the node process.",
            response.process.max_file_descriptors as f64,
        ),
        MetricSample::gauge(
            "logstash_node_process_cpu_percent",
            "CPU usage of the node process in percent.",
            response.process.cpu.percent,
        ),
        MetricSample::counter(
            "logstash_node_events_in_total",
            "Events received by the node.",
            response.events.events_in as f64,
        ),
        MetricSample::counter(
            "logstash_node_events_filtered_total",
            "Events filtered by the node.",
            response.events.filtered as f64,
        ),
        MetricSample::counter(
            "logstash_node_events_out_total",
            "Events emitted by the node.",
            response.events.out as f64,
        ),
        MetricSample::counter(
            "logstash_node_events_duration_seconds_total",
            "Cumulative event processing time.",
            response.events.duration_in_millis as f64 / 1_000.0,
        ),
    ]
}
