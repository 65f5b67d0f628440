use std::fmt;

use serde::{Deserialize, Serialize};

use super::mapper::{DataFormat, QueryExecutor};

/// A value converted to the catalog type of the column it is matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int(value) => write!(f, "{value}"),
            TypedValue::Float(value) => write!(f, "{value}"),
            TypedValue::String(value) => f.write_str(value),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::String(value.to_string())
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        TypedValue::Int(value)
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        TypedValue::Float(value)
    }
}

/// Typed match values for one column, or one fixed combination of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColumnMatchGroup {
    Simple {
        column: String,
        match_ids: Vec<TypedValue>,
    },
    Composite {
        /// Sorted column names; every tuple in `match_ids` follows this order
        columns: Vec<String>,
        match_ids: Vec<Vec<TypedValue>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionKeyValue {
    pub key: String,
    pub value: TypedValue,
}

impl PartitionKeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Everything an executor needs to search one partition of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub data_mapper_id: String,
    pub query_executor: QueryExecutor,
    pub format: DataFormat,
    pub database: String,
    pub table: String,
    pub columns: Vec<ColumnMatchGroup>,
    pub partition_keys: Vec<PartitionKeyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(default = "default_delete_old_versions")]
    pub delete_old_versions: bool,
}

fn default_delete_old_versions() -> bool {
    true
}
