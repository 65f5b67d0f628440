use serde::{Deserialize, Serialize};

/// A column or partition key as declared in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Raw type definition, e.g. `int` or `struct<id:int,name:string>`
    #[serde(rename = "type")]
    pub data_type: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Table metadata fetched from the catalog for one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub database: String,
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub partition_keys: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn new(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            name: name.into(),
            columns: Vec::new(),
            partition_keys: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push(ColumnDescriptor::new(name, data_type));
        self
    }

    pub fn with_partition_key(
        mut self,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        self.partition_keys.push(ColumnDescriptor::new(name, data_type));
        self
    }

    pub fn is_partitioned(&self) -> bool {
        !self.partition_keys.is_empty()
    }
}

/// One catalog partition; values line up with the table's partition keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionDescriptor {
    pub values: Vec<String>,
}

impl PartitionDescriptor {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}
