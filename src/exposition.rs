//! Text exposition encoding.
//!
//! Converts the samples drained from one poll into Prometheus metric
//! families, merges them with the exporter's own registry (scrape
//! durations, build info) and encodes everything in text format.

use std::collections::{BTreeMap, HashSet};

use prometheus::proto::{self, MetricFamily, MetricType};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::collector::{MetricKind, MetricSample};

/// Content type of the text exposition format.
pub fn content_type() -> &'static str {
    prometheus::TEXT_FORMAT
}

/// Encode one poll's samples plus the exporter registry's own families.
pub fn render(samples: Vec<MetricSample>, registry: &Registry) -> Result<String, prometheus::Error> {
    let mut families = to_families(samples);
    families.extend(registry.gather());

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;
    Ok(String::from_utf8(buffer).expect("text exposition is valid utf-8"))
}

/// Group samples into metric families, in deterministic name order.
///
/// Two samples with the same (name, label set) identity are a producer
/// contract violation; the later one is dropped with a warning so the
/// exposition stays valid.
pub fn to_families(samples: Vec<MetricSample>) -> Vec<MetricFamily> {
    let mut seen: HashSet<(String, Vec<(String, String)>)> = HashSet::new();
    let mut grouped: BTreeMap<String, (MetricKind, String, Vec<proto::Metric>)> = BTreeMap::new();

    for sample in samples {
        let identity = (
            sample.name.clone(),
            sample
                .labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        if !seen.insert(identity) {
            tracing::warn!(
                metric = %sample.name,
                "duplicate sample identity dropped from exposition"
            );
            continue;
        }

        let entry = grouped
            .entry(sample.name.clone())
            .or_insert_with(|| (sample.kind, sample.help.clone(), Vec::new()));
        if entry.0 != sample.kind {
            tracing::warn!(
                metric = %sample.name,
                "conflicting sample kinds within one family, keeping the first"
            );
        }
        let kind = entry.0;
        entry.2.push(to_metric(&sample, kind));
    }

    grouped
        .into_iter()
        .map(|(name, (kind, help, metrics))| {
            let mut family = MetricFamily::default();
            family.set_name(name);
            family.set_help(help);
            family.set_field_type(metric_type(kind));
            for metric in metrics {
                family.mut_metric().push(metric);
            }
            family
        })
        .collect()
}

fn metric_type(kind: MetricKind) -> MetricType {
    match kind {
        MetricKind::Counter => MetricType::COUNTER,
        MetricKind::Gauge => MetricType::GAUGE,
        MetricKind::Summary => MetricType::SUMMARY,
    }
}

fn to_metric(sample: &MetricSample, kind: MetricKind) -> proto::Metric {
    let mut metric = proto::Metric::default();

    for (key, value) in &sample.labels {
        let mut pair = proto::LabelPair::default();
        pair.set_name(key.clone());
        pair.set_value(value.clone());
        metric.mut_label().push(pair);
    }

    match kind {
        MetricKind::Counter => {
            let mut counter = proto::Counter::default();
            counter.set_value(sample.value);
            metric.set_counter(counter);
        }
        MetricKind::Gauge => {
            let mut gauge = proto::Gauge::default();
            gauge.set_value(sample.value);
            metric.set_gauge(gauge);
        }
        MetricKind::Summary => {
            // A summary sample represents a single observation.
            let mut summary = proto::Summary::default();
            summary.set_sample_count(1);
            summary.set_sample_sum(sample.value);
            metric.set_summary(summary);
        }
    }

    metric
}
