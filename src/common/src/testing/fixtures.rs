//! Data mapper fixtures pointing at `test_db`.

use crate::model::{DataMapperConfig, DataMapperRecord, QueryExecutorParameters};

/// An athena/glue/parquet data mapper record over `test_db.<table>`.
pub fn data_mapper_record(id: &str, table: &str, columns: &[&str]) -> DataMapperRecord {
    DataMapperRecord {
        data_mapper_id: id.to_string(),
        query_executor: "athena".to_string(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        format: "parquet".to_string(),
        query_executor_parameters: QueryExecutorParameters {
            data_catalog_provider: "glue".to_string(),
            database: "test_db".to_string(),
            table: table.to_string(),
        },
        role_arn: None,
        delete_old_versions: None,
    }
}

/// Same as [`data_mapper_record`], already validated.
pub fn data_mapper(id: &str, table: &str, columns: &[&str]) -> DataMapperConfig {
    DataMapperConfig::try_from(data_mapper_record(id, table, columns))
        .expect("fixture record is valid")
}
