//! Collaborators the compiler reads from: the data catalog, the deletion
//! queue and the data mapper registry.

use std::path::PathBuf;

use async_trait::async_trait;
use common::model::{DataMapperRecord, DeletionMatch, PartitionDescriptor, TableDescriptor};
use futures::stream::BoxStream;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::{FileCatalog, FileDataMapperStore, FileDeletionQueue};
pub use memory::{InMemoryCatalog, InMemoryDataMapperStore, InMemoryDeletionQueue};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Table {database}.{table} not found in catalog")]
    TableNotFound { database: String, table: String },

    #[error("No deletion queue found for job {0}")]
    JobNotFound(String),

    #[error("Invalid job id: {0}")]
    InvalidJobId(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SourceError {
    /// I/O failures may clear up on retry; missing or malformed data will not.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Io { .. })
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Table and partition metadata.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataCatalog: Send + Sync {
    async fn get_table(&self, database: &str, table: &str) -> SourceResult<TableDescriptor>;

    /// Partitions in catalog order, fetched lazily page by page.
    ///
    /// Unpartitioned tables yield nothing.
    fn get_partitions(
        &self,
        database: &str,
        table: &str,
    ) -> BoxStream<'static, SourceResult<PartitionDescriptor>>;
}

/// Pending deletion requests, grouped by job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeletionQueue: Send + Sync {
    async fn entries(&self, job_id: &str) -> SourceResult<Vec<DeletionMatch>>;
}

/// Registry of data mappers, i.e. the datasets a deletion job covers.
#[cfg_attr(test, mockall::automock)]
pub trait DataMapperStore: Send + Sync {
    fn data_mappers(&self) -> BoxStream<'static, SourceResult<DataMapperRecord>>;
}
