// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use reqwest::blocking::Client;
use std::process;
use tracing_subscriber::EnvFilter;

use bento_mirror::{
    format_error, load_config, BucketClient, Catalog, CatalogEntry, Config, DownloadManager,
    HttpTransfer, ListingError, SyncEvent, SyncOutcome,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes following sysexits.h conventions
mod exit_codes {
    /// Data error - a configured version requirement is malformed
    pub const DATA_ERR: i32 = 65;
    /// Service unavailable - the bucket listing could not be fetched
    pub const SERVICE_UNAVAILABLE: i32 = 69;
    /// I/O error - a downloaded box could not be put in place
    pub const IO_ERR: i32 = 74;
}

use exit_codes::*;

/// Spinner helpers for consistent progress indicators
mod spinner {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::io::IsTerminal;
    use std::time::Duration;

    /// Create a spinner on stderr, hidden when stderr is not a terminal
    pub fn create(message: &str) -> ProgressBar {
        if !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("\u{28FB}\u{28F9}\u{28FC}\u{28F8}\u{28FE}\u{28F6}\u{28F7}\u{28E7}\u{28CF}\u{28DF} ");
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }
}

/// bento-mirror - Mirror the latest matching Vagrant boxes to local disk.
#[derive(Parser)]
#[command(name = "bento-mirror")]
#[command(version = VERSION)]
#[command(about = "Mirror the latest matching Vagrant boxes to local disk.")]
#[command(long_about = "bento-mirror - Mirror the latest matching Vagrant boxes\n\n\
    Lists the bento bucket, picks the newest 32-bit and 64-bit box for every\n\
    entry in the registry and downloads the ones that changed.\n\n\
    Sync everything:     bento-mirror\n\
    Only list picks:     bento-mirror -n\n\
    Debug logging:       RUST_LOG=debug bento-mirror\n\n\
    Settings live in ~/.bento-mirror/config.json.")]
struct Cli {
    /// List the selected boxes without downloading anything
    #[arg(short = 'n', long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the box lines on stdout stay parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config().context("Failed to load configuration")?;
    let client = config
        .http_client()
        .context("Failed to create HTTP client")?;

    let catalog = match fetch_catalog(&config, client.clone()) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!(
                "{}",
                format_error(
                    &format!("Failed to fetch the bucket listing: {}", e),
                    &[
                        "No network connection",
                        "Wrong bucket_url in the config file",
                        "The bucket is temporarily unavailable",
                    ],
                    &[
                        &format!("Check the bucket in a browser: {}", config.bucket_url),
                        "Check bucket_url in ~/.bento-mirror/config.json",
                    ],
                )
                .red()
            );
            process::exit(SERVICE_UNAVAILABLE);
        }
    };
    tracing::debug!("Catalog has {} boxes", catalog.len());

    let selected = match catalog.select(&config.boxes) {
        Ok(selected) => selected,
        Err(e) => {
            eprintln!(
                "{}",
                format_error(
                    &e.to_string(),
                    &["A requirement in the box registry is not a valid version constraint"],
                    &[
                        "Use an operator followed by a dotted version, e.g. \"~> 6.0\" or \">= 7\"",
                        "Fix the boxes list in ~/.bento-mirror/config.json",
                    ],
                )
                .red()
            );
            process::exit(DATA_ERR);
        }
    };

    if selected.is_empty() {
        eprintln!(
            "{} No boxes in the bucket match the configured registry",
            "[!]".yellow()
        );
        return Ok(());
    }

    let manager = DownloadManager::new(
        HttpTransfer::new(client),
        &config.bucket_url,
        &config.destination,
    )
    .with_dry_run(cli.dry_run);

    match manager.run_with_progress(&selected, print_event) {
        Ok(summary) => {
            if !manager.is_dry_run() {
                eprintln!("{}", summary.to_string().dimmed());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{}",
                format_error(
                    &e.to_string(),
                    &[
                        "The destination is read-only or full",
                        "A directory is in the way of a box file",
                    ],
                    &[&format!(
                        "Check permissions under {}",
                        config.destination.display()
                    )],
                )
                .red()
            );
            process::exit(IO_ERR);
        }
    }
}

fn fetch_catalog(config: &Config, client: Client) -> Result<Catalog, ListingError> {
    let spinner = spinner::create(&format!("Listing {}", config.bucket_url));
    let result = Catalog::fetch(&BucketClient::new(&config.bucket_url, client));
    spinner.finish_and_clear();
    result
}

fn print_event(event: SyncEvent<'_>) {
    match event {
        SyncEvent::Started { entry, .. } => println!("{}", box_line(entry)),
        SyncEvent::Finished {
            entry,
            outcome: SyncOutcome::Failed { reason },
        } => eprintln!("{}", failure_line(entry, reason)),
        SyncEvent::Finished { .. } => {}
    }
}

fn failure_line(entry: &CatalogEntry, reason: &str) -> String {
    format!("{} Failed to download {}: {}", "[✗]".red(), entry, reason)
}

/// `os version bits -> key`, in fixed-width columns.
fn box_line(entry: &CatalogEntry) -> String {
    format!(
        "{:<8} {:<5} {:>2}bit -> {}",
        entry.os(),
        entry.version().to_string(),
        entry.bitness().bits(),
        entry.remote_path()
    )
}
