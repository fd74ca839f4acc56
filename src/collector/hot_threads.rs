//! Hot-thread diagnostics collector.
//!
//! Polls the node's `/_node/hot_threads` API and emits the busiest-thread
//! count plus a per-thread CPU-time gauge.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::StartupError;
use crate::collector::{Collector, MetricSample, MetricSink, ScrapeError, fetch_json};

/// Number of threads to sample.
const THREADS: u32 = 32;
/// Stack-trace lines requested per thread.
const STACKTRACE_SIZE: u32 = 0;
/// Whether idle threads are excluded from the sample.
const IGNORE_IDLE_THREADS: bool = false;

/// Build the hot-threads endpoint for a base node URL.
///
/// Pure and deterministic: the fixed path segment is appended to the base
/// endpoint and the three query parameters are encoded in ascending
/// alphabetical key order.
pub fn hot_threads_endpoint(base: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(&format!(
        "{}/_node/hot_threads",
        base.trim_end_matches('/')
    ))?;
    url.query_pairs_mut()
        .append_pair("ignore_idle_threads", &IGNORE_IDLE_THREADS.to_string())
        .append_pair("stacktrace_size", &STACKTRACE_SIZE.to_string())
        .append_pair("threads", &THREADS.to_string());
    Ok(url.to_string())
}

/// Response of the hot-threads API.
///
/// Required fields are required in the schema: a payload missing any of
/// them is a decode error, never a zero-value fallback.
#[derive(Debug, Deserialize)]
pub struct HotThreadsResponse {
    pub host: String,
    pub version: String,
    pub id: String,
    pub name: String,
    pub status: String,
    pub hot_threads: HotThreads,
}

/// The thread-sample section of the response.
#[derive(Debug, Deserialize)]
pub struct HotThreads {
    pub busiest_threads: i64,
    pub threads: Vec<ThreadSample>,
}

/// One sampled thread.
#[derive(Debug, Deserialize)]
pub struct ThreadSample {
    pub name: String,
    pub thread_id: i64,
    pub percent_of_cpu_time: f64,
    pub state: String,
    /// Absent when the node is asked for zero stack-trace lines.
    #[serde(default)]
    pub traces: Vec<String>,
}

/// Collector for hot-thread diagnostics.
pub struct HotThreadsCollector {
    endpoint: String,
    client: Client,
}

impl HotThreadsCollector {
    /// Registry name of this collector.
    pub const NAME: &'static str = "hot_threads";

    /// Create the collector, caching the fully built endpoint.
    pub fn new(base_endpoint: &str, client: Client) -> Result<Self, StartupError> {
        Ok(Self {
            endpoint: hot_threads_endpoint(base_endpoint)?,
            client,
        })
    }
}

#[async_trait::async_trait]
impl Collector for HotThreadsCollector {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn collect(&self, sink: &MetricSink) -> Result<(), ScrapeError> {
        let response: HotThreadsResponse = fetch_json(&self.client, &self.endpoint).await?;
        sink.emit_all(samples_from(&response));
        Ok(())
    }
}

/// Derive metric samples from a decoded response.
fn samples_from(response: &HotThreadsResponse) -> Vec<MetricSample> {
    let mut samples = Vec::with_capacity(1 + response.hot_threads.threads.len());

    samples.push(MetricSample::gauge(
        "logstash_hot_threads_busiest_count",
        "Number of busiest threads reported by the node.",
        response.hot_threads.busiest_threads as f64,
    ));

    for thread in &response.hot_threads.threads {
        samples.push(
            MetricSample::gauge(
                "logstash_hot_threads_thread_cpu_time_percent",
                "CPU time percentage of a sampled hot thread.",
                thread.percent_of_cpu_time,
            )
            .with_label("name", thread.name.as_str())
            .with_label("thread_id", thread.thread_id.to_string())
            .with_label("state", thread.state.as_str()),
        );
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_THREAD_PAYLOAD: &str = r#"{
        "host": "logstash-0",
        "version": "7.17.0",
        "http_address": "127.0.0.1:9600",
        "id": "3b1c2a",
        "name": "logstash-0",
        "ephemeral_id": "e-1",
        "status": "green",
        "snapshot": false,
        "hot_threads": {
            "time": "2024-01-01T00:00:00Z",
            "busiest_threads": 2,
            "threads": [
                {
                    "name": "[main]>worker0",
                    "thread_id": 31,
                    "percent_of_cpu_time": 12.5,
                    "state": "runnable",
                    "traces": ["frame-a", "frame-b"]
                },
                {
                    "name": "[main]>worker1",
                    "thread_id": 32,
                    "percent_of_cpu_time": 0.25,
                    "state": "timed_waiting",
                    "traces": []
                }
            ]
        }
    }"#;

    #[test]
    fn test_endpoint_construction() {
        assert_eq!(
            hot_threads_endpoint("http://h:9600").unwrap(),
            "http://h:9600/_node/hot_threads?ignore_idle_threads=false&stacktrace_size=0&threads=32"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_normalized() {
        assert_eq!(
            hot_threads_endpoint("http://h:9600/").unwrap(),
            hot_threads_endpoint("http://h:9600").unwrap()
        );
    }

    #[test]
    fn test_endpoint_invalid_base_rejected() {
        assert!(hot_threads_endpoint("not a url").is_err());
    }

    #[test]
    fn test_decode_two_thread_payload() {
        let response: HotThreadsResponse = serde_json::from_str(TWO_THREAD_PAYLOAD).unwrap();

        assert_eq!(response.host, "logstash-0");
        assert_eq!(response.version, "7.17.0");
        assert_eq!(response.status, "green");
        assert_eq!(response.hot_threads.busiest_threads, 2);
        assert_eq!(response.hot_threads.threads.len(), 2);

        let first = &response.hot_threads.threads[0];
        assert_eq!(first.name, "[main]>worker0");
        assert_eq!(first.thread_id, 31);
        assert_eq!(first.percent_of_cpu_time, 12.5);
        assert_eq!(first.state, "runnable");
        assert_eq!(first.traces, vec!["frame-a", "frame-b"]);
    }

    #[test]
    fn test_decode_rejects_missing_required_field() {
        // No "hot_threads" section at all.
        let err = serde_json::from_str::<HotThreadsResponse>(
            r#"{"host":"h","version":"7","id":"i","name":"n","status":"green"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("hot_threads"));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(serde_json::from_str::<HotThreadsResponse>("{oops").is_err());
    }

    #[test]
    fn test_samples_from_response() {
        let response: HotThreadsResponse = serde_json::from_str(TWO_THREAD_PAYLOAD).unwrap();
        let samples = samples_from(&response);

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].name, "logstash_hot_threads_busiest_count");
        assert_eq!(samples[0].value, 2.0);
        assert!(samples[0].labels.is_empty());

        let worker0 = &samples[1];
        assert_eq!(worker0.name, "logstash_hot_threads_thread_cpu_time_percent");
        assert_eq!(worker0.value, 12.5);
        assert_eq!(
            worker0.labels.get("name").map(String::as_str),
            Some("[main]>worker0")
        );
        assert_eq!(
            worker0.labels.get("thread_id").map(String::as_str),
            Some("31")
        );
        assert_eq!(
            worker0.labels.get("state").map(String::as_str),
            Some("runnable")
        );
    }
}
