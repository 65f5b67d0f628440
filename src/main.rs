use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Configuration;
use common::cli::{CommonArgs, CommonCommands, utils};
use compiler::sources::{FileCatalog, FileDataMapperStore, FileDeletionQueue};
use compiler::{QueryDelivery, QueryGenerator};
use messaging::config::BackendConfig;
use tracing::Instrument;

#[derive(Parser)]
#[command(name = "erasure")]
#[command(about = "Compiles pending erasure requests into per-partition deletion queries")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: ErasureCommands,
}

#[derive(Subcommand)]
enum ErasureCommands {
    /// Compile one deletion job and deliver the resulting queries
    Compile {
        #[arg(long, help = "Deletion job to compile")]
        job_id: String,
    },
    #[command(flatten)]
    Common(CommonCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::init_logging(&cli.common);

    let config = utils::load_config(cli.common.config.as_ref())?;

    match cli.command {
        ErasureCommands::Common(ref command) => utils::handle_common_command(command, &config),
        ErasureCommands::Compile { ref job_id } => {
            utils::validate_config(&config)?;
            let span = tracing::info_span!("compile", job_id = %job_id);
            compile(&config, job_id).instrument(span).await
        }
    }
}

async fn compile(config: &Configuration, job_id: &str) -> Result<()> {
    let sources = &config.sources;
    let generator = QueryGenerator::new(
        Arc::new(FileCatalog::new(
            &sources.catalog_path,
            sources.partition_page_size,
        )),
        Arc::new(FileDeletionQueue::new(&sources.deletion_queue_dir)),
        Arc::new(FileDataMapperStore::new(&sources.data_mappers_path)),
        config.compiler.clone(),
    );

    let report = generator
        .generate(job_id)
        .await
        .with_context(|| format!("Failed to compile deletion job {job_id}"))?;

    for failure in &report.failures {
        log::warn!(
            "Data mapper {} was skipped: {}",
            failure.data_mapper_id,
            failure.error
        );
    }

    let backend = BackendConfig::from(config.delivery.backend).create_backend();
    let delivery = QueryDelivery::from_config(backend, &config.delivery);
    let batches = delivery
        .deliver(job_id, &report.queries)
        .await
        .with_context(|| format!("Failed to deliver queries for job {job_id}"))?;

    log::info!(
        "Job {job_id}: delivered {} queries in {batches} batches to {}",
        report.queries.len(),
        config.delivery.topic
    );
    Ok(())
}
