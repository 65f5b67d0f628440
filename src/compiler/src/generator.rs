use std::sync::Arc;

use common::config::{CompilerConfig, FailurePolicy};
use common::model::{CompiledQuery, DataMapperConfig, DataMapperRecord, DeletionMatch};
use futures::StreamExt;

use crate::assemble::assemble;
use crate::classify::classify;
use crate::error::{CompileError, CompileResult};
use crate::sources::{DataCatalog, DataMapperStore, DeletionQueue, SourceResult};

/// A dataset that failed to compile while the job kept going.
#[derive(Debug)]
pub struct DatasetFailure {
    pub data_mapper_id: String,
    pub error: CompileError,
}

/// Result of compiling one deletion job across all data mappers.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Compiled queries in data mapper order
    pub queries: Vec<CompiledQuery>,
    /// Datasets skipped under [`FailurePolicy::Skip`]
    pub failures: Vec<DatasetFailure>,
}

/// Compiles deletion jobs into per-partition queries for every data mapper.
pub struct QueryGenerator {
    catalog: Arc<dyn DataCatalog>,
    queue: Arc<dyn DeletionQueue>,
    data_mappers: Arc<dyn DataMapperStore>,
    config: CompilerConfig,
}

impl QueryGenerator {
    pub fn new(
        catalog: Arc<dyn DataCatalog>,
        queue: Arc<dyn DeletionQueue>,
        data_mappers: Arc<dyn DataMapperStore>,
        config: CompilerConfig,
    ) -> Self {
        Self {
            catalog,
            queue,
            data_mappers,
            config,
        }
    }

    /// Compile every data mapper against the job's deletion queue.
    ///
    /// Errors reading any source end the job. Per-dataset compilation errors
    /// end it too unless the failure policy is `skip`.
    pub async fn generate(&self, job_id: &str) -> CompileResult<GenerationReport> {
        let matches = self.queue.entries(job_id).await?;
        log::info!(
            "Compiling job {job_id}: {} deletion queue entries",
            matches.len()
        );

        let mut outcomes = self
            .data_mappers
            .data_mappers()
            .map(|record| self.compile_record(record, &matches))
            .buffered(self.config.concurrency.max(1));

        let mut report = GenerationReport::default();
        while let Some(outcome) = outcomes.next().await {
            let (data_mapper_id, result) = outcome?;
            match result {
                Ok(queries) => {
                    log::debug!(
                        "Data mapper {data_mapper_id} compiled to {} queries",
                        queries.len()
                    );
                    report.queries.extend(queries);
                }
                Err(error @ CompileError::Source(_)) => return Err(error),
                Err(error) if self.config.failure_policy == FailurePolicy::Abort => {
                    log::error!("Failed to compile data mapper {data_mapper_id}: {error}");
                    return Err(error);
                }
                Err(error) => {
                    log::warn!(
                        "Skipping data mapper {data_mapper_id}: {error}. Continuing with other data mappers."
                    );
                    report.failures.push(DatasetFailure {
                        data_mapper_id,
                        error,
                    });
                }
            }
        }

        log::info!(
            "Job {job_id} compiled: {} queries, {} skipped data mappers",
            report.queries.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Outer error: the record itself could not be read.
    async fn compile_record(
        &self,
        record: SourceResult<DataMapperRecord>,
        matches: &[DeletionMatch],
    ) -> CompileResult<(String, CompileResult<Vec<CompiledQuery>>)> {
        let record = record?;
        let data_mapper_id = record.data_mapper_id.clone();
        let result = match DataMapperConfig::try_from(record) {
            Ok(mapper) => self.compile_dataset(&mapper, matches).await,
            Err(e) => Err(e.into()),
        };
        Ok((data_mapper_id, result))
    }

    /// Compile one dataset.
    ///
    /// The table is only fetched when some match applies to this data mapper,
    /// and partitions only when classification produced groups.
    pub async fn compile_dataset(
        &self,
        mapper: &DataMapperConfig,
        matches: &[DeletionMatch],
    ) -> CompileResult<Vec<CompiledQuery>> {
        if !matches.iter().any(|m| m.applies_to(&mapper.id)) {
            log::debug!("No deletion matches apply to data mapper {}", mapper.id);
            return Ok(Vec::new());
        }

        let table = self
            .catalog
            .get_table(&mapper.database, &mapper.table)
            .await?;
        let groups = classify(matches, mapper, &table)?;
        assemble(self.catalog.as_ref(), mapper, &table, groups).await
    }
}
