//! CLI glue for feed-sync: argument parsing, wiring the HTTP clients and
//! running one synchronisation.
//!
//! All synchronisation logic lives in [`feed_sync_core`]; this module only
//! builds the configuration and the concrete clients and hands them over.
//! Call [`run`] with a constructed [`Cli`] for programmatic or test use.

use crate::cms::WebflowClient;
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feed_sync_core::feed::HttpFeedSource;
use feed_sync_core::synchronise::{synchronise, SyncOptions};
use std::path::PathBuf;

/// CLI for feed-sync: publish new feed entries to a CMS collection.
#[derive(Parser)]
#[clap(
    name = "feed-sync",
    version,
    about = "Create CMS collection items for RSS/Atom entries that are not published yet"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one synchronisation pass
    Sync {
        /// Optional YAML file with non-secret settings; environment variables take precedence
        #[clap(long)]
        config: Option<PathBuf>,
        /// Log what would be created without calling the CMS create endpoint
        #[clap(long)]
        dry_run: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config, dry_run } => {
            let config = load_config(config.as_deref())?;
            tracing::info!(command = "sync", dry_run, "Starting synchronisation process");

            let http = reqwest::Client::builder()
                .user_agent(concat!("feed-sync/", env!("CARGO_PKG_VERSION")))
                .build()
                .context("Failed to build HTTP client")?;
            let cms = WebflowClient::new(http.clone(), &config.cms);
            let feed = HttpFeedSource::new(http, config.feed_url.clone());
            let options = SyncOptions {
                delay: config.delay,
                dry_run,
            };

            match synchronise(&cms, &feed, &options).await {
                Ok(report) => {
                    tracing::info!(
                        command = "sync",
                        entries = report.entries.len(),
                        created = report.created(),
                        failed = report.failed(),
                        skipped = report.skipped(),
                        "Synchronisation complete"
                    );
                    tracing::debug!(?report, "Synchronisation report");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
