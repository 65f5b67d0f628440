use common::model::ConfigurationError;

use crate::schema::PrimitiveKind;
use crate::sources::SourceError;

/// Failures while compiling one dataset's deletion queries.
///
/// Everything except `Source` is a deterministic problem with the input data
/// and will fail the same way on every retry.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Column schema is not valid")]
    InvalidSchema { definition: String },

    #[error("Column {column} does not exist")]
    UnknownColumn { column: String },

    #[error("Column {path} has no field named {field}")]
    UnknownField { path: String, field: String },

    #[error("Column {path} is not a supported column type for querying")]
    UnsupportedType { path: String },

    #[error("Value {value} for column {path} cannot be cast to {kind}")]
    Cast {
        path: String,
        value: String,
        kind: PrimitiveKind,
    },

    #[error(
        "Partition of {database}.{table} has {actual} values but the table declares {expected} partition keys"
    )]
    PartitionMismatch {
        database: String,
        table: String,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl CompileError {
    /// Whether retrying the same compilation could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CompileError::Source(source) => source.is_transient(),
            _ => false,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
