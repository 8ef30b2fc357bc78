//! get-papers-list - PubMed papers with non-academic (pharma/biotech) authors
//!
//! ## Usage
//!
//! ```bash
//! get-papers-list "cancer immunotherapy AND 2024[dp]" -f results.csv
//! get-papers-list "crispr" --debug
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use get_papers_list::{
    affiliation::AffiliationClassifier,
    classify, export,
    pubmed::{ClientConfig, PubMedClient, DEFAULT_EUTILS_URL},
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch PubMed papers with at least one non-academic (pharma/biotech) author.
#[derive(Parser)]
#[command(name = "get-papers-list")]
#[command(version, about, long_about = None)]
struct Cli {
    /// PubMed query string (use full PubMed syntax)
    query: String,

    /// Filename to save results as CSV. If not provided, prints to console.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print debug information during execution
    #[arg(short, long)]
    debug: bool,

    /// Maximum number of PubMed ids to retrieve
    #[arg(long, default_value = "100")]
    max_results: usize,

    /// PubMed ids per efetch request
    #[arg(long, default_value = "200")]
    batch_size: usize,

    /// NCBI API key (raises the rate limit)
    #[arg(long, env = "NCBI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Contact email sent to NCBI with each request
    #[arg(long, env = "NCBI_EMAIL")]
    email: Option<String>,

    /// E-utilities base URL
    #[arg(long, default_value = DEFAULT_EUTILS_URL, hide = true)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging (stderr, so stdout carries only CSV)
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,get_papers_list={}", log_level)));

    fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if cli.debug {
                debug!(error = ?e, "Failure details");
            }
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

async fn run(cli: &Cli) -> Result<()> {
    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        api_key: cli.api_key.clone().filter(|k| !k.is_empty()),
        email: cli.email.clone().filter(|e| !e.is_empty()),
        max_results: cli.max_results,
        batch_size: cli.batch_size,
        timeout: Duration::from_secs(cli.timeout),
        ..Default::default()
    };
    let client = PubMedClient::new(config).context("Failed to create PubMed client")?;
    let classifier = AffiliationClassifier::new().context("Failed to build classifier")?;

    // --- Stage 1: esearch + efetch ---
    eprintln!("Fetching PubMed IDs...");
    let ids = client
        .search_ids(&cli.query)
        .await
        .context("PubMed search failed")?;

    if ids.is_empty() {
        eprintln!("No papers found for the given query.");
        return Ok(());
    }

    eprintln!("Found {} papers. Fetching details...", ids.len());
    let papers = client
        .fetch_papers(&ids)
        .await
        .context("Failed to fetch paper details")?;

    // --- Stage 2: classify + emit ---
    let rows = classify::filter_papers(&classifier, &papers);
    if rows.is_empty() {
        eprintln!("No papers found with non-academic (pharma/biotech) authors.");
        return Ok(());
    }

    match &cli.file {
        Some(path) => {
            let abs_path = export::save_csv(path, &rows)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Results saved to: {}", abs_path.display());
        }
        None => export::print_csv(&rows).context("Failed to print CSV")?,
    }

    Ok(())
}
