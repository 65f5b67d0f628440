use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Common CLI arguments shared across all binaries
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

/// Commands that inspect the configuration instead of running a job
#[derive(Subcommand, Debug, Clone)]
pub enum CommonCommands {
    /// Show current configuration and exit
    Config {
        #[arg(long, help = "Show configuration in JSON format")]
        json: bool,
    },
    /// Validate configuration and exit
    Validate,
    /// Show version information and exit
    Version,
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::Configuration;
    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Initialize logging based on CLI arguments
    pub fn init_logging(args: &CommonArgs) {
        let level = if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    /// Load configuration with optional override from CLI
    pub fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration> {
        match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Configuration::load_from_path(path).context("Failed to load configuration")
            }
            None => Configuration::load().context("Failed to load configuration"),
        }
    }

    /// Display configuration in human-readable or JSON format
    pub fn display_config(config: &Configuration, json: bool) -> Result<()> {
        if json {
            let json = serde_json::to_string_pretty(config)
                .context("Failed to serialize configuration to JSON")?;
            println!("{json}");
        } else {
            println!("Erasure Configuration:");
            println!("======================");
            println!("Compiler concurrency: {}", config.compiler.concurrency);
            println!("Failure policy: {:?}", config.compiler.failure_policy);
            println!("Catalog: {}", config.sources.catalog_path.display());
            println!(
                "Deletion queue directory: {}",
                config.sources.deletion_queue_dir.display()
            );
            println!("Data mappers: {}", config.sources.data_mappers_path.display());
            println!("Partition page size: {}", config.sources.partition_page_size);
            println!("Delivery backend: {:?}", config.delivery.backend);
            println!("Delivery topic: {}", config.delivery.topic);
            println!("Delivery batch size: {}", config.delivery.batch_size);
        }
        Ok(())
    }

    /// Validate configuration and report any issues
    pub fn validate_config(config: &Configuration) -> Result<()> {
        log::info!("Validating configuration...");

        if config.compiler.concurrency == 0 {
            anyhow::bail!("Compiler concurrency must be at least 1");
        }

        if config.sources.partition_page_size == 0 {
            anyhow::bail!("Partition page size must be at least 1");
        }

        if config.delivery.batch_size == 0 {
            anyhow::bail!("Delivery batch size must be at least 1");
        }

        if config.delivery.topic.is_empty() {
            anyhow::bail!("Delivery topic cannot be empty");
        }

        for (name, path) in [
            ("Catalog path", &config.sources.catalog_path),
            ("Deletion queue directory", &config.sources.deletion_queue_dir),
            ("Data mappers path", &config.sources.data_mappers_path),
        ] {
            if path.as_os_str().is_empty() {
                anyhow::bail!("{name} cannot be empty");
            }
        }

        log::info!("Configuration validation passed");
        Ok(())
    }

    /// Handle common CLI commands that don't run a job
    pub fn handle_common_command(command: &CommonCommands, config: &Configuration) -> Result<()> {
        match command {
            CommonCommands::Config { json } => display_config(config, *json),
            CommonCommands::Validate => validate_config(config),
            CommonCommands::Version => {
                println!("{}", version_info());
                Ok(())
            }
        }
    }

    /// Standard version information
    pub fn version_info() -> String {
        format!(
            "{} {} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_RUST_VERSION")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    #[test]
    fn test_version_info() {
        let version = utils::version_info();
        assert!(version.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_default_configuration_is_valid() {
        assert!(utils::validate_config(&Configuration::default()).is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_batch_size() {
        let mut config = Configuration::default();
        config.delivery.batch_size = 0;

        let err = utils::validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("batch size"));
    }

    #[test]
    fn test_validation_rejects_empty_catalog_path() {
        let mut config = Configuration::default();
        config.sources.catalog_path = Default::default();

        let err = utils::validate_config(&config).unwrap_err();
        assert_eq!(err.to_string(), "Catalog path cannot be empty");
    }
}
