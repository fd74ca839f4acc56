//! Node identity and pipeline-settings collector.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::StartupError;
use crate::collector::{Collector, MetricSample, MetricSink, ScrapeError, fetch_json};

/// Build the node-info endpoint for a base node URL.
pub fn node_info_endpoint(base: &str) -> Result<String, url::ParseError> {
    let url = Url::parse(&format!("{}/_node", base.trim_end_matches('/')))?;
    Ok(url.to_string())
}

/// Response of the node-info API.
#[derive(Debug, Deserialize)]
pub struct NodeInfoResponse {
    pub host: String,
    pub version: String,
    pub id: String,
    pub name: String,
    pub status: String,
    pub pipeline: PipelineSettings,
}

/// Static pipeline settings of the node.
#[derive(Debug, Deserialize)]
pub struct PipelineSettings {
    pub workers: i64,
    pub batch_size: i64,
    pub batch_delay: i64,
}

/// Collector for node identity and pipeline settings.
pub struct NodeInfoCollector {
    endpoint: String,
    client: Client,
}

impl NodeInfoCollector {
    /// Registry name of this collector.
    pub const NAME: &'static str = "info";

    /// Create the collector, caching the fully built endpoint.
    pub fn new(base_endpoint: &str, client: Client) -> Result<Self, StartupError> {
        Ok(Self {
            endpoint: node_info_endpoint(base_endpoint)?,
            client,
        })
    }
}

#[async_trait::async_trait]
impl Collector for NodeInfoCollector {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn collect(&self, sink: &MetricSink) -> Result<(), ScrapeError> {
        let response: NodeInfoResponse = fetch_json(&self.client, &self.endpoint).await?;
        sink.emit_all(samples_from(&response));
        Ok(())
    }
}

fn samples_from(response: &NodeInfoResponse) -> Vec<MetricSample> {
    vec![
        MetricSample::gauge(
            "logstash_node_info",
            "Identity of the monitored node; the value is always 1.",
            1.0,
        )
        .with_label("version", response.version.as_str())
        .with_label("host", response.host.as_str())
        .with_label("name", response.name.as_str())
        .with_label("id", response.id.as_str())
        .with_label("status", response.status.as_str()),
        MetricSample::gauge(
            "logstash_node_pipeline_workers",
            "Number of configured pipeline workers.",
            response.pipeline.workers as f64,
        ),
        MetricSample::gauge(
            "logstash_node_pipeline_batch_size",
            "Configured pipeline batch size.",
            response.pipeline.batch_size as f64,
        ),
        MetricSample::gauge(
            "logstash_node_pipeline_batch_delay",
            "Configured pipeline batch delay in milliseconds.",
            response.pipeline.batch_delay as f64,
        ),
    ]
}
