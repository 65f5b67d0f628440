//! Test configuration builder for creating test setups quickly.

use std::path::Path;

use crate::config::{Configuration, DeliveryBackend, FailurePolicy};

/// Builder for creating test configurations.
///
/// # Example
///
/// ```rust,ignore
/// use common::testing::TestConfigBuilder;
///
/// let temp = tempfile::TempDir::new().unwrap();
/// let config = TestConfigBuilder::new()
///     .with_data_dir(temp.path())
///     .in_memory_delivery()
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TestConfigBuilder {
    config: Configuration,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigBuilder {
    /// Create a new test configuration builder.
    ///
    /// Compilation runs one dataset at a time so that log output and
    /// failures are easy to follow.
    pub fn new() -> Self {
        let mut config = Configuration::default();
        config.compiler.concurrency = 1;
        Self { config }
    }

    /// Point all file-backed sources into `dir`.
    ///
    /// Uses `catalog.json`, `data_mappers.json` and a `queue/` directory.
    pub fn with_data_dir(mut self, dir: &Path) -> Self {
        self.config.sources.catalog_path = dir.join("catalog.json");
        self.config.sources.data_mappers_path = dir.join("data_mappers.json");
        self.config.sources.deletion_queue_dir = dir.join("queue");
        self
    }

    /// Deliver compiled queries to the in-memory backend.
    pub fn in_memory_delivery(mut self) -> Self {
        self.config.delivery.backend = DeliveryBackend::Memory;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.config.delivery.batch_size = batch_size;
        self
    }

    pub fn with_partition_page_size(mut self, page_size: usize) -> Self {
        self.config.sources.partition_page_size = page_size;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.compiler.concurrency = concurrency;
        self
    }

    /// Keep compiling sibling datasets when one fails.
    pub fn skipping_failed_datasets(mut self) -> Self {
        self.config.compiler.failure_policy = FailurePolicy::Skip;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Configuration {
        self.config
    }
}
