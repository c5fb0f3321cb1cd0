//! Link-Harvest main entry point
//!
//! This is the command-line interface for the Link-Harvest sitemap link harvester.

use anyhow::Context;
use clap::Parser;
use link_harvest::config::{load_config_with_hash, Config};
use link_harvest::crawler::Coordinator;
use link_harvest::output::{print_statistics, CsvOutputHandler, OutputHandler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link-Harvest: a polite sitemap link harvester
///
/// Link-Harvest reads a site's sitemap, fetches every listed page with bounded
/// concurrency and randomized delays, and writes every hyperlink it finds to a
/// CSV file with the columns Title, URL and found_link.
#[derive(Parser, Debug)]
#[command(name = "link-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite sitemap link harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    handle_crawl(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_harvest=info,warn"),
            1 => EnvFilter::new("link_harvest=debug,info"),
            2 => EnvFilter::new("link_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs the crawl and writes the dataset to the configured CSV file
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!("Sitemap: {}", config.crawler.sitemap_url);
    tracing::info!(
        "Concurrency limit: {}, delay {}..={}ms, max retries: {}",
        config.crawler.concurrency_limit,
        config.crawler.min_delay_ms,
        config.crawler.max_delay_ms,
        config.crawler.max_retries
    );

    let csv_path = config.output.csv_path.clone();
    let coordinator = Coordinator::new(config).context("building HTTP client")?;

    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let mut output = CsvOutputHandler::new(&csv_path);
    output
        .write_dataset(&report.dataset)
        .and_then(|()| output.finish())
        .with_context(|| format!("writing {}", csv_path))?;

    if !quiet {
        print_statistics(&report.statistics);
    }

    Ok(())
}
