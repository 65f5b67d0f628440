use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

/// What to do when a single dataset fails to compile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole job on the first failing dataset.
    #[default]
    Abort,
    /// Log the failure, report it, and keep compiling sibling datasets.
    Skip,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Maximum number of datasets compiled at the same time
    pub concurrency: usize,
    /// Behaviour on per-dataset compilation errors
    pub failure_policy: FailurePolicy,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

/// Locations of the file-backed collaborators.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// JSON file describing tables, their partition keys and partitions
    pub catalog_path: PathBuf,
    /// Directory holding one `<job_id>.json` deletion queue per job
    pub deletion_queue_dir: PathBuf,
    /// JSON file holding the registered data mappers
    pub data_mappers_path: PathBuf,
    /// Number of partitions fetched from the catalog per page
    pub partition_page_size: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(".data/catalog.json"),
            deletion_queue_dir: PathBuf::from(".data/queue"),
            data_mappers_path: PathBuf::from(".data/data_mappers.json"),
            partition_page_size: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryBackend {
    Memory,
    #[default]
    Stdout,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub backend: DeliveryBackend,
    /// Topic the compiled query batches are published to
    pub topic: String,
    /// Maximum number of compiled queries per published batch
    pub batch_size: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            backend: DeliveryBackend::Stdout,
            topic: "queries".to_string(),
            batch_size: 10,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Query compilation settings
    pub compiler: CompilerConfig,
    /// Catalog, deletion queue and data mapper sources
    pub sources: SourcesConfig,
    /// Where compiled queries are handed off
    pub delivery: DeliveryConfig,
}

impl Configuration {
    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Configuration::default()))
    }

    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Self::figment()
            .merge(Toml::file("erasure.toml"))
            .merge(Env::prefixed("ERASURE__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Load configuration from an explicit TOML file, still honouring env overrides.
    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        let config = Self::figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed("ERASURE__").split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}
