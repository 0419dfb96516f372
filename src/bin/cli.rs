//! UP RERA scraper CLI
//!
//! Local execution entry point. Reports print as pretty JSON on stdout;
//! logs go to stderr.

use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::sync::Arc;
#[cfg(feature = "browser")]
use std::time::Duration;

use clap::{Parser, Subcommand};
use rera_scraper::{config::Config, error::Result, pipeline, storage::StorageWriter};

#[cfg(feature = "browser")]
use rera_scraper::browser::ChromiumBrowser;

/// UP RERA registered-project scraper
#[derive(Parser, Debug)]
#[command(
    name = "rera-scraper",
    version,
    about = "Scrapes UP RERA registered projects into partitioned NDJSON batches"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the portal and persist a handoff artifact
    #[cfg(feature = "browser")]
    Scrape {
        /// Cap on retained records (default: config)
        #[arg(long)]
        max_projects: Option<usize>,

        /// Browser session timeout in seconds (default: config)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Directory for the handoff artifact (default: config)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Verify a handoff artifact and print a summary report
    Verify {
        /// Path to the artifact JSON file
        path: PathBuf,
    },

    /// Upload a handoff artifact's records as one NDJSON batch
    Upload {
        /// Path to the artifact JSON file
        path: PathBuf,

        /// LOCAL, file://<path>, or a bucket name (default: config)
        #[arg(long)]
        destination: Option<String>,

        /// Partition key prefix (default: config)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_report<T: serde::Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        #[cfg(feature = "browser")]
        Command::Scrape {
            max_projects,
            timeout_secs,
            output_dir,
        } => {
            let mut config = config;
            if let Some(dir) = output_dir {
                config.output.dir = dir.to_string_lossy().into_owned();
            }
            let max_records = max_projects.unwrap_or(config.scrape.max_projects);
            let timeout =
                Duration::from_secs(timeout_secs.unwrap_or(config.scrape.timeout_secs));

            let browser = Arc::new(ChromiumBrowser::new(&config.scrape.user_agent));
            let summary = pipeline::run_scrape(browser, &config, max_records, timeout).await?;
            print_report(&summary)?;
        }

        Command::Verify { path } => {
            let report = pipeline::verify_handoff(&path).await;
            print_report(&report)?;
        }

        Command::Upload {
            path,
            destination,
            prefix,
        } => {
            let destination =
                destination.unwrap_or_else(|| config.upload.destination.clone());
            let prefix = prefix.unwrap_or_else(|| config.upload.prefix.clone());

            let writer = StorageWriter::from_config(&config.upload);
            let report = pipeline::run_upload(&writer, &path, &destination, &prefix).await?;
            print_report(&report)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {e}");
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
