use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use common::model::{DataMapperRecord, DeletionMatch, PartitionDescriptor, TableDescriptor};
use futures::stream::BoxStream;

use super::{DataCatalog, DataMapperStore, DeletionQueue, SourceError, SourceResult};

const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
struct CatalogTable {
    descriptor: TableDescriptor,
    partitions: Vec<PartitionDescriptor>,
}

/// Catalog held in memory, serving partitions in fixed-size pages.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    tables: Arc<HashMap<(String, String), CatalogTable>>,
    page_size: usize,
    page_fetches: Arc<AtomicUsize>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self {
            tables: Arc::new(HashMap::new()),
            page_size: DEFAULT_PAGE_SIZE,
            page_fetches: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_table<I>(mut self, descriptor: TableDescriptor, partitions: I) -> Self
    where
        I: IntoIterator<Item = PartitionDescriptor>,
    {
        let key = (descriptor.database.clone(), descriptor.name.clone());
        Arc::make_mut(&mut self.tables).insert(
            key,
            CatalogTable {
                descriptor,
                partitions: partitions.into_iter().collect(),
            },
        );
        self
    }

    /// Number of non-empty partition pages served so far.
    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataCatalog for InMemoryCatalog {
    async fn get_table(&self, database: &str, table: &str) -> SourceResult<TableDescriptor> {
        self.tables
            .get(&(database.to_string(), table.to_string()))
            .map(|entry| entry.descriptor.clone())
            .ok_or_else(|| SourceError::TableNotFound {
                database: database.to_string(),
                table: table.to_string(),
            })
    }

    fn get_partitions(
        &self,
        database: &str,
        table: &str,
    ) -> BoxStream<'static, SourceResult<PartitionDescriptor>> {
        let tables = Arc::clone(&self.tables);
        let page_fetches = Arc::clone(&self.page_fetches);
        let page_size = self.page_size;
        let database = database.to_string();
        let table = table.to_string();

        Box::pin(async_stream::stream! {
            let Some(entry) = tables.get(&(database.clone(), table.clone())) else {
                yield Err(SourceError::TableNotFound { database, table });
                return;
            };

            for page in entry.partitions.chunks(page_size) {
                page_fetches.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                for partition in page {
                    yield Ok(partition.clone());
                }
            }
        })
    }
}

/// Deletion queue held in memory. Unknown jobs have no entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeletionQueue {
    jobs: Arc<HashMap<String, Vec<DeletionMatch>>>,
}

impl InMemoryDeletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job<I>(mut self, job_id: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = DeletionMatch>,
    {
        Arc::make_mut(&mut self.jobs).insert(job_id.into(), entries.into_iter().collect());
        self
    }
}

#[async_trait]
impl DeletionQueue for InMemoryDeletionQueue {
    async fn entries(&self, job_id: &str) -> SourceResult<Vec<DeletionMatch>> {
        Ok(self.jobs.get(job_id).cloned().unwrap_or_default())
    }
}

/// Data mapper registry held in memory, served in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataMapperStore {
    records: Arc<Vec<DataMapperRecord>>,
}

impl InMemoryDataMapperStore {
    pub fn new<I>(records: I) -> Self
    where
        I: IntoIterator<Item = DataMapperRecord>,
    {
        Self {
            records: Arc::new(records.into_iter().collect()),
        }
    }
}

impl DataMapperStore for InMemoryDataMapperStore {
    fn data_mappers(&self) -> BoxStream<'static, SourceResult<DataMapperRecord>> {
        let records = Arc::clone(&self.records);
        Box::pin(async_stream::stream! {
            for record in records.iter() {
                yield Ok(record.clone());
            }
        })
    }
}
