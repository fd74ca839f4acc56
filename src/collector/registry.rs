//! Immutable registry of named collectors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::StartupError;
use crate::collector::Collector;

/// Registry mapping collector names to collector instances.
///
/// Built once at process start and immutable afterwards; each poll takes a
/// read-only snapshot. Names must be unique.
pub struct CollectorRegistry {
    collectors: HashMap<String, Arc<dyn Collector>>,
}

impl CollectorRegistry {
    /// Build a registry from a set of collectors.
    ///
    /// # Errors
    /// Returns `StartupError::DuplicateCollector` if two collectors share
    /// a name.
    pub fn new(collectors: Vec<Arc<dyn Collector>>) -> Result<Self, StartupError> {
        let mut map: HashMap<String, Arc<dyn Collector>> =
            HashMap::with_capacity(collectors.len());
        for collector in collectors {
            let name = collector.name().to_string();
            if map.insert(name.clone(), collector).is_some() {
                return Err(StartupError::DuplicateCollector(name));
            }
        }
        Ok(Self { collectors: map })
    }

    /// Number of registered collectors.
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Iterate over the registered collectors.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Collector>> {
        self.collectors.values()
    }

    /// Registered collector names.
    pub fn names(&self) -> Vec<&str> {
        self.collectors.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorRegistry")
            .field("collectors", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{MetricSink, ScrapeError};

    struct NamedCollector(&'static str);

    #[async_trait::async_trait]
    impl Collector for NamedCollector {
        fn name(&self) -> &str {
            self.0
        }

        async fn collect(&self, _sink: &MetricSink) -> Result<(), ScrapeError> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_unique_names() {
        let registry = CollectorRegistry::new(vec![
            Arc::new(NamedCollector("info")),
            Arc::new(NamedCollector("node")),
            Arc::new(NamedCollector("hot_threads")),
        ])
        .unwrap();

        assert_eq!(registry.len(), 3);
        let mut names = registry.names();
        names.sort_unstable();
        assert_eq!(names, vec!["hot_threads", "info", "node"]);
    }

    #[test]
    fn test_registry_rejects_duplicate_name() {
        let result = CollectorRegistry::new(vec![
            Arc::new(NamedCollector("node")),
            Arc::new(NamedCollector("node")),
        ]);

        match result {
            Err(StartupError::DuplicateCollector(name)) => assert_eq!(name, "node"),
            other => panic!("expected DuplicateCollector, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = CollectorRegistry::new(Vec::new()).unwrap();
        assert!(registry.is_empty());
    }
}
