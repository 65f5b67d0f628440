use common::model::{
    ColumnMatchGroup, CompiledQuery, DataMapperConfig, MatchValue, PartitionDescriptor,
    PartitionKeyValue, TableDescriptor,
};
use futures::TryStreamExt;
use log::debug;

use crate::cast::cast;
use crate::error::{CompileError, CompileResult};
use crate::sources::DataCatalog;

/// Build one query per partition of `table`, each carrying the same groups.
///
/// Nothing is emitted, and the catalog is not consulted, when `groups` is
/// empty. Unpartitioned tables get a single query with no partition keys.
pub async fn assemble(
    catalog: &dyn DataCatalog,
    mapper: &DataMapperConfig,
    table: &TableDescriptor,
    groups: Vec<ColumnMatchGroup>,
) -> CompileResult<Vec<CompiledQuery>> {
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    if !table.is_partitioned() {
        return Ok(vec![compiled_query(mapper, table, &groups, Vec::new())]);
    }

    let mut partitions = catalog.get_partitions(&table.database, &table.name);
    let mut queries = Vec::new();
    while let Some(partition) = partitions.try_next().await? {
        let keys = partition_keys(table, &partition)?;
        queries.push(compiled_query(mapper, table, &groups, keys));
    }

    debug!(
        "Data mapper {} produced {} queries over {}.{}",
        mapper.id,
        queries.len(),
        table.database,
        table.name
    );
    Ok(queries)
}

/// Cast a partition's values to the table's partition key types.
fn partition_keys(
    table: &TableDescriptor,
    partition: &PartitionDescriptor,
) -> CompileResult<Vec<PartitionKeyValue>> {
    if partition.values.len() != table.partition_keys.len() {
        return Err(CompileError::PartitionMismatch {
            database: table.database.clone(),
            table: table.name.clone(),
            expected: table.partition_keys.len(),
            actual: partition.values.len(),
        });
    }

    table
        .partition_keys
        .iter()
        .zip(&partition.values)
        .map(|(key, value)| {
            cast(&MatchValue::from(value.as_str()), &key.name, &table.partition_keys)
                .map(|value| PartitionKeyValue::new(key.name.clone(), value))
        })
        .collect()
}

fn compiled_query(
    mapper: &DataMapperConfig,
    table: &TableDescriptor,
    groups: &[ColumnMatchGroup],
    partition_keys: Vec<PartitionKeyValue>,
) -> CompiledQuery {
    CompiledQuery {
        data_mapper_id: mapper.id.clone(),
        query_executor: mapper.executor,
        format: mapper.format,
        database: table.database.clone(),
        table: table.name.clone(),
        columns: groups.to_vec(),
        partition_keys,
        role_arn: mapper.role_arn.clone(),
        delete_old_versions: mapper.deletes_old_versions(),
    }
}
