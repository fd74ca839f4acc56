//! Metric sample model and the shared emission sink.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Kind of a metric sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonically increasing value.
    Counter,
    /// Point-in-time value.
    Gauge,
    /// One observation of a distribution.
    Summary,
}

/// One normalized metric sample produced by a collector.
///
/// Identity is the (name, label set) pair; two samples with the same
/// identity in one poll are a producer contract violation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Fully qualified metric name.
    pub name: String,
    /// Label set. Keys are unique by construction.
    pub labels: BTreeMap<String, String>,
    /// Numeric value.
    pub value: f64,
    /// Sample kind.
    pub kind: MetricKind,
    /// Help text for the exposition encoder. Not part of identity.
    pub help: String,
}

impl MetricSample {
    /// Create a counter sample.
    pub fn counter(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self::new(name, help, value, MetricKind::Counter)
    }

    /// Create a gauge sample.
    pub fn gauge(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self::new(name, help, value, MetricKind::Gauge)
    }

    /// Create a summary sample representing a single observation.
    pub fn summary(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self::new(name, help, value, MetricKind::Summary)
    }

    fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        value: f64,
        kind: MetricKind,
    ) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            value,
            kind,
            help: help.into(),
        }
    }

    /// Attach a label. Re-using a key overwrites the previous value.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Sample identity: metric name plus label set.
    pub fn identity(&self) -> (&str, &BTreeMap<String, String>) {
        (&self.name, &self.labels)
    }
}

/// Shared sample sink written concurrently by every collector task
/// during one poll and drained once all tasks have joined.
#[derive(Debug, Default)]
pub struct MetricSink {
    samples: Mutex<Vec<MetricSample>>,
}

impl MetricSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample.
    pub fn emit(&self, sample: MetricSample) {
        self.samples
            .lock()
            .expect("metric sink lock poisoned")
            .push(sample);
    }

    /// Append a batch of samples.
    pub fn emit_all(&self, samples: impl IntoIterator<Item = MetricSample>) {
        let mut guard = self.samples.lock().expect("metric sink lock poisoned");
        guard.extend(samples);
    }

    /// Take every sample accumulated so far, leaving the sink empty.
    pub fn drain(&self) -> Vec<MetricSample> {
        std::mem::take(&mut *self.samples.lock().expect("metric sink lock poisoned"))
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.lock().expect("metric sink lock poisoned").len()
    }

    /// Whether the sink holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_sample_builder() {
        let sample = MetricSample::gauge("logstash_node_jvm_threads_count", "JVM threads", 42.0)
            .with_label("state", "runnable");

        assert_eq!(sample.name, "logstash_node_jvm_threads_count");
        assert_eq!(sample.kind, MetricKind::Gauge);
        assert_eq!(sample.value, 42.0);
        assert_eq!(sample.labels.get("state").map(String::as_str), Some("runnable"));
    }

    #[test]
    fn test_label_keys_unique() {
        let sample = MetricSample::counter("c", "", 1.0)
            .with_label("k", "first")
            .with_label("k", "second");

        assert_eq!(sample.labels.len(), 1);
        assert_eq!(sample.labels.get("k").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_sink_drain_empties() {
        let sink = MetricSink::new();
        sink.emit(MetricSample::gauge("g", "", 1.0));
        sink.emit(MetricSample::gauge("g2", "", 2.0));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_sink_concurrent_emission_preserves_union() {
        let sink = Arc::new(MetricSink::new());
        let mut tasks = Vec::new();

        for worker in 0..8 {
            let sink = Arc::clone(&sink);
            tasks.push(tokio::spawn(async move {
                for i in 0..100 {
                    sink.emit(
                        MetricSample::gauge(format!("worker_{worker}_sample"), "", f64::from(i))
                            .with_label("i", i.to_string()),
                    );
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let samples = sink.drain();
        assert_eq!(samples.len(), 8 * 100);
        for worker in 0..8 {
            let name = format!("worker_{worker}_sample");
            assert_eq!(samples.iter().filter(|s| s.name == name).count(), 100);
        }
    }
}
