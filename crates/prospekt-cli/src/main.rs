//! Prospekt Scraper command line exporter
//!
//! Collects every flyer listed under the hypermarket category of
//! prospektmaschine.de and writes them to `prospects.tmp.json` in the
//! working directory. Takes no arguments; log verbosity follows `RUST_LOG`.

use std::process::ExitCode;

use anyhow::Context;
use prospekt_core::{write_json, ProspektScraper};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Root listing page whose categories are scraped
const ROOT_URL: &str = "https://www.prospektmaschine.de/hypermarkte/";

/// Export destination, relative to the working directory
const OUTPUT_PATH: &str = "prospects.tmp.json";

async fn run() -> anyhow::Result<usize> {
    let scraper = ProspektScraper::new();

    let prospects = scraper
        .collect(ROOT_URL)
        .await
        .with_context(|| format!("collecting prospects from {ROOT_URL}"))?;

    write_json(OUTPUT_PATH, &prospects)
        .with_context(|| format!("writing {OUTPUT_PATH}"))?;

    Ok(prospects.len())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(count) => {
            info!(count, path = OUTPUT_PATH, "done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Prospects not fetched: {err:#}");
            ExitCode::FAILURE
        }
    }
}
