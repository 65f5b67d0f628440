//! Shared data model for deletion query compilation.
//!
//! The types here describe what flows between the catalog, the deletion
//! queue, the data mapper registry and the compiler, and what the compiler
//! hands to the delivery channel.

pub mod catalog;
pub mod deletion;
pub mod mapper;
pub mod query;

pub use catalog::{ColumnDescriptor, PartitionDescriptor, TableDescriptor};
pub use deletion::{ColumnValue, DeletionMatch, MatchValue};
pub use mapper::{
    ConfigurationError, DataCatalogProvider, DataFormat, DataMapperConfig, DataMapperRecord,
    QueryExecutor, QueryExecutorParameters,
};
pub use query::{ColumnMatchGroup, CompiledQuery, PartitionKeyValue, TypedValue};
