//! JSON-file collaborators. Every call re-reads its file so a compilation
//! always sees the current contents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use common::model::{DataMapperRecord, DeletionMatch, PartitionDescriptor, TableDescriptor};
use futures::stream::BoxStream;
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{DataCatalog, DataMapperStore, DeletionQueue, SourceError, SourceResult};

async fn read_json<T: DeserializeOwned>(path: &Path) -> SourceResult<T> {
    let bytes = tokio::fs::read(path).await.map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tables: Vec<CatalogFileTable>,
}

#[derive(Debug, Deserialize)]
struct CatalogFileTable {
    #[serde(flatten)]
    descriptor: TableDescriptor,
    #[serde(default)]
    partitions: Vec<PartitionDescriptor>,
}

impl CatalogFile {
    fn into_table(self, database: &str, table: &str) -> SourceResult<CatalogFileTable> {
        self.tables
            .into_iter()
            .find(|entry| entry.descriptor.database == database && entry.descriptor.name == table)
            .ok_or_else(|| SourceError::TableNotFound {
                database: database.to_string(),
                table: table.to_string(),
            })
    }
}

/// Catalog backed by a single JSON document:
///
/// ```json
/// {"tables": [{"database": "db", "name": "t",
///              "columns": [{"name": "id", "type": "int"}],
///              "partition_keys": [{"name": "year", "type": "int"}],
///              "partitions": [["2010"], ["2011"]]}]}
/// ```
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
    page_size: usize,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>, page_size: usize) -> Self {
        Self {
            path: path.into(),
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl DataCatalog for FileCatalog {
    async fn get_table(&self, database: &str, table: &str) -> SourceResult<TableDescriptor> {
        let catalog: CatalogFile = read_json(&self.path).await?;
        Ok(catalog.into_table(database, table)?.descriptor)
    }

    fn get_partitions(
        &self,
        database: &str,
        table: &str,
    ) -> BoxStream<'static, SourceResult<PartitionDescriptor>> {
        let path = self.path.clone();
        let page_size = self.page_size;
        let database = database.to_string();
        let table = table.to_string();

        Box::pin(async_stream::stream! {
            let entry = match read_json::<CatalogFile>(&path).await {
                Ok(catalog) => catalog.into_table(&database, &table),
                Err(e) => Err(e),
            };
            let partitions = match entry {
                Ok(entry) => entry.partitions,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            for (page, rows) in partitions.chunks(page_size).enumerate() {
                debug!("Serving partition page {page} of {database}.{table} ({} rows)", rows.len());
                for partition in rows {
                    yield Ok(partition.clone());
                }
            }
        })
    }
}

/// Deletion queue stored as one `<job_id>.json` array per job.
#[derive(Debug, Clone)]
pub struct FileDeletionQueue {
    dir: PathBuf,
}

impl FileDeletionQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn job_path(&self, job_id: &str) -> SourceResult<PathBuf> {
        let valid = !job_id.is_empty()
            && !job_id.contains(['/', '\\'])
            && !job_id.contains("..")
            && !job_id.starts_with('.');
        if !valid {
            return Err(SourceError::InvalidJobId(job_id.to_string()));
        }
        Ok(self.dir.join(format!("{job_id}.json")))
    }
}

#[async_trait]
impl DeletionQueue for FileDeletionQueue {
    async fn entries(&self, job_id: &str) -> SourceResult<Vec<DeletionMatch>> {
        let path = self.job_path(job_id)?;
        match read_json(&path).await {
            Err(SourceError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Err(SourceError::JobNotFound(job_id.to_string()))
            }
            result => result,
        }
    }
}

/// Data mapper registry stored as a JSON array of records.
#[derive(Debug, Clone)]
pub struct FileDataMapperStore {
    path: PathBuf,
}

impl FileDataMapperStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataMapperStore for FileDataMapperStore {
    fn data_mappers(&self) -> BoxStream<'static, SourceResult<DataMapperRecord>> {
        let path = self.path.clone();
        Box::pin(async_stream::stream! {
            match read_json::<Vec<DataMapperRecord>>(&path).await {
                Ok(records) => {
                    for record in records {
                        yield Ok(record);
                    }
                }
                Err(e) => yield Err(e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_json(dir: &TempDir, name: &str, value: serde_json::Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
        path
    }

    fn catalog_json() -> serde_json::Value {
        json!({
            "tables": [{
                "database": "test_db",
                "name": "test_table",
                "columns": [{"name": "customer_id", "type": "string"}],
                "partition_keys": [{"name": "year", "type": "int"}],
                "partitions": [["2010"], ["2011"], ["2012"]]
            }]
        })
    }

    #[tokio::test]
    async fn test_file_catalog_reads_tables_and_partitions() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(write_json(&dir, "catalog.json", catalog_json()), 2);

        let table = catalog.get_table("test_db", "test_table").await.unwrap();
        assert_eq!(
            table,
            TableDescriptor::new("test_db", "test_table")
                .with_column("customer_id", "string")
                .with_partition_key("year", "int")
        );

        let partitions: Vec<_> = catalog
            .get_partitions("test_db", "test_table")
            .try_collect()
            .await
            .unwrap();
        assert_eq!(
            partitions,
            vec![
                PartitionDescriptor::new(["2010"]),
                PartitionDescriptor::new(["2011"]),
                PartitionDescriptor::new(["2012"]),
            ]
        );
    }

    #[tokio::test]
    async fn test_file_catalog_sees_updates() {
        let dir = TempDir::new().unwrap();
        let path = write_json(&dir, "catalog.json", json!({"tables": []}));
        let catalog = FileCatalog::new(&path, 10);

        assert!(matches!(
            catalog.get_table("test_db", "test_table").await,
            Err(SourceError::TableNotFound { .. })
        ));

        write_json(&dir, "catalog.json", catalog_json());
        assert!(catalog.get_table("test_db", "test_table").await.is_ok());
    }

    #[tokio::test]
    async fn test_file_catalog_missing_file_is_transient() {
        let dir = TempDir::new().unwrap();
        let catalog = FileCatalog::new(dir.path().join("missing.json"), 10);

        let err = catalog.get_table("test_db", "test_table").await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.is_transient());

        let result: SourceResult<Vec<_>> = catalog
            .get_partitions("test_db", "test_table")
            .try_collect()
            .await;
        assert!(matches!(result, Err(SourceError::Io { .. })));
    }

    #[tokio::test]
    async fn test_file_deletion_queue() {
        let dir = TempDir::new().unwrap();
        write_json(
            &dir,
            "job-1.json",
            json!([
                {"match_id": "hi"},
                {"match_id": [{"column": "age", "value": "28"}], "type": "Composite", "data_mappers": ["a"]}
            ]),
        );
        let queue = FileDeletionQueue::new(dir.path());

        let entries = queue.entries("job-1").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], DeletionMatch::simple("hi"));
        assert!(entries[1].applies_to("a"));
        assert!(!entries[1].applies_to("b"));

        assert!(matches!(
            queue.entries("job-2").await,
            Err(SourceError::JobNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_file_deletion_queue_rejects_path_like_job_ids() {
        let dir = TempDir::new().unwrap();
        let queue = FileDeletionQueue::new(dir.path());

        for job_id in ["", "../job", "a/b", "a\\b", ".hidden"] {
            assert!(
                matches!(queue.entries(job_id).await, Err(SourceError::InvalidJobId(_))),
                "{job_id:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_file_deletion_queue_malformed_entry() {
        let dir = TempDir::new().unwrap();
        write_json(&dir, "job-1.json", json!([{"match_id": [], "type": "Composite"}]));
        let queue = FileDeletionQueue::new(dir.path());

        assert!(matches!(
            queue.entries("job-1").await,
            Err(SourceError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_data_mapper_store() {
        let dir = TempDir::new().unwrap();
        let path = write_json(
            &dir,
            "data_mappers.json",
            json!([{
                "data_mapper_id": "a",
                "query_executor": "athena",
                "columns": ["customer_id"],
                "format": "parquet",
                "query_executor_parameters": {
                    "data_catalog_provider": "glue",
                    "database": "test_db",
                    "table": "test_table"
                },
                "role_arn": "arn:aws:iam::123456789012:role/erasure"
            }]),
        );
        let store = FileDataMapperStore::new(path);

        let records: Vec<_> = store.data_mappers().try_collect().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data_mapper_id, "a");
        assert_eq!(
            records[0].role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/erasure")
        );
    }
}
