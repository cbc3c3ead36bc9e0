//! rustpubmed - PubMed Industry-Author Extraction Pipeline
//!
//! Searches PubMed for a given query, keeps only authors affiliated with
//! commercial organizations, and writes one CSV row per surviving author.
//!
//! ## Usage
//!
//! ```bash
//! rustpubmed "cancer immunotherapy" -f results.csv --date-from 2023
//! rustpubmed "diabetes" -d --api-key YOUR_KEY --email you@example.com
//! rustpubmed "heart disease" --date --reldate 365
//! ```

use std::path::PathBuf;

use clap::Parser;
use rustpubmed::eutils::{EntrezClient, SearchOptions, SortOrder};
use rustpubmed::pipeline;
use tracing::{error, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// PubMed Industry-Author Extraction Pipeline - Rust CLI
#[derive(Parser)]
#[command(name = "rustpubmed")]
#[command(version, about, long_about = None)]
#[command(after_help = "Notes:
  - An NCBI API key (https://www.ncbi.nlm.nih.gov/account/) raises the request rate limit.
  - Without one, E-utilities allows about 3 requests per second.")]
struct Cli {
    /// The search query to run against PubMed
    query: String,

    /// Path of the CSV file where results are written
    #[arg(short, long, default_value = "output.csv")]
    filepath: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Your NCBI API key
    #[arg(long)]
    api_key: Option<String>,

    /// Contact email for E-utilities requests
    #[arg(long)]
    email: Option<String>,

    /// Only papers published within the last N days
    #[arg(long)]
    reldate: Option<u32>,

    /// Only papers published after this date (YYYY, YYYY/MM, or YYYY/MM/DD)
    #[arg(long)]
    date_from: Option<String>,

    /// Only papers published before this date (YYYY, YYYY/MM, or YYYY/MM/DD)
    #[arg(long)]
    date_to: Option<String>,

    /// Order results by relevance (default)
    #[arg(long, conflicts_with = "date")]
    relevance: bool,

    /// Order results by publication date
    #[arg(long)]
    date: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let sort = match (cli.relevance, cli.date) {
        (_, true) => SortOrder::PubDate,
        _ => SortOrder::Relevance,
    };
    let options = SearchOptions {
        sort,
        reldate: cli.reldate,
        mindate: cli.date_from,
        maxdate: cli.date_to,
        api_key: cli.api_key,
        email: cli.email,
    };

    let client = match EntrezClient::new() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            std::process::exit(e.exit_code());
        }
    };

    match pipeline::run(&client, &cli.query, &cli.filepath, &options).await {
        Ok(path) => println!("Results written to {}", path.display()),
        Err(e) => {
            error!(error = %e, "run failed");
            std::process::exit(e.exit_code());
        }
    }
}
