use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning a stored data mapper record into a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Unsupported query executor: {0}")]
    UnsupportedQueryExecutor(String),

    #[error("Unsupported data catalog provider: {0}")]
    UnsupportedCatalogProvider(String),

    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),
}

/// Engine that will run the compiled queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryExecutor {
    Athena,
}

impl FromStr for QueryExecutor {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "athena" => Ok(QueryExecutor::Athena),
            other => Err(ConfigurationError::UnsupportedQueryExecutor(
                other.to_string(),
            )),
        }
    }
}

impl fmt::Display for QueryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryExecutor::Athena => f.write_str("athena"),
        }
    }
}

/// Catalog service holding the table metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataCatalogProvider {
    Glue,
}

impl FromStr for DataCatalogProvider {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "glue" => Ok(DataCatalogProvider::Glue),
            other => Err(ConfigurationError::UnsupportedCatalogProvider(
                other.to_string(),
            )),
        }
    }
}

/// Storage format of the table's data objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    Parquet,
    Json,
}

impl FromStr for DataFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parquet" => Ok(DataFormat::Parquet),
            "json" => Ok(DataFormat::Json),
            other => Err(ConfigurationError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryExecutorParameters {
    pub data_catalog_provider: String,
    pub database: String,
    pub table: String,
}

/// A data mapper exactly as stored in the registry.
///
/// Executor, provider and format are kept as strings so that one bad record
/// can be rejected without failing to read its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMapperRecord {
    pub data_mapper_id: String,
    pub query_executor: String,
    pub columns: Vec<String>,
    pub format: String,
    pub query_executor_parameters: QueryExecutorParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_old_versions: Option<bool>,
}

/// A validated data mapper: which table to search, in which columns, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMapperConfig {
    pub id: String,
    pub executor: QueryExecutor,
    pub catalog: DataCatalogProvider,
    pub database: String,
    pub table: String,
    /// Queryable columns in configured order; nested fields use dotted paths
    pub columns: Vec<String>,
    pub format: DataFormat,
    pub role_arn: Option<String>,
    pub delete_old_versions: Option<bool>,
}

impl DataMapperConfig {
    /// Old object versions are removed unless the mapper opts out.
    pub fn deletes_old_versions(&self) -> bool {
        self.delete_old_versions.unwrap_or(true)
    }
}

impl TryFrom<DataMapperRecord> for DataMapperConfig {
    type Error = ConfigurationError;

    fn try_from(record: DataMapperRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            executor: record.query_executor.parse()?,
            catalog: record
                .query_executor_parameters
                .data_catalog_provider
                .parse()?,
            format: record.format.parse()?,
            id: record.data_mapper_id,
            database: record.query_executor_parameters.database,
            table: record.query_executor_parameters.table,
            columns: record.columns,
            role_arn: record.role_arn,
            delete_old_versions: record.delete_old_versions,
        })
    }
}
