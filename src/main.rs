//! biopaper - Crossref paper search with AI summaries
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! biopaper search "RNA-seq" --open-access --start-year 2018 --api-key sk-...
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! biopaper serve --port 3000
//! ```

use anyhow::{Context, Result};
use biopaper::{
    config::{self, SearchConfig, DEFAULT_ROWS, DEFAULT_START_YEAR},
    crossref::{CrossrefClient, SearchCriteria},
    export, render,
    server::{self, AppState},
    session::Session,
    summarizer::{LlmConfig, Summarizer, DEFAULT_BASE_URL, DEFAULT_MODEL},
};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Crossref paper search with AI abstract summaries
#[derive(Parser)]
#[command(name = "biopaper")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Endpoints shared by both modes
#[derive(Args)]
struct EndpointArgs {
    /// Crossref works endpoint
    #[arg(long, default_value = config::CROSSREF_API_URL)]
    crossref_url: String,

    /// LLM API base URL (OpenAI-compatible)
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    llm_base_url: String,

    /// LLM model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Crossref and print the results
    Search {
        /// Search keywords
        keyword: String,

        /// Only open access articles
        #[arg(long)]
        open_access: bool,

        /// Journal name filter
        #[arg(long)]
        journal: Option<String>,

        /// Earliest publication year
        #[arg(long, default_value_t = DEFAULT_START_YEAR)]
        start_year: i32,

        /// Latest publication year (default: current year)
        #[arg(long)]
        end_year: Option<i32>,

        /// Number of results
        #[arg(long, default_value_t = DEFAULT_ROWS)]
        rows: u32,

        /// OpenAI API key (enables AI summaries)
        #[arg(long)]
        api_key: Option<String>,

        /// Skip AI summaries even when a key is given
        #[arg(long)]
        no_summary: bool,

        /// Also save the results as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        #[command(flatten)]
        endpoints: EndpointArgs,
    },

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[command(flatten)]
        endpoints: EndpointArgs,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            keyword,
            open_access,
            journal,
            start_year,
            end_year,
            rows,
            api_key,
            no_summary,
            csv,
            endpoints,
        } => {
            let criteria = SearchCriteria {
                keyword,
                open_access_only: open_access,
                journal,
                start_year: Some(start_year),
                end_year: Some(end_year.unwrap_or_else(config::current_year)),
            };
            run_search(criteria, rows, api_key, no_summary, csv, endpoints).await
        }
        Commands::Serve {
            port,
            host,
            endpoints,
        } => run_server(host, port, endpoints).await,
    }
}

fn build_clients(endpoints: &EndpointArgs) -> Result<(CrossrefClient, Summarizer)> {
    let search_config =
        SearchConfig::with_base_url(&endpoints.crossref_url).context("Invalid --crossref-url")?;
    let llm_config = LlmConfig::new(&endpoints.llm_base_url, &endpoints.model)
        .context("Invalid --llm-base-url")?;

    Ok((
        CrossrefClient::new(search_config)?,
        Summarizer::new(llm_config)?,
    ))
}

// ============================================================================
// Search
// ============================================================================

async fn run_search(
    criteria: SearchCriteria,
    rows: u32,
    api_key: Option<String>,
    no_summary: bool,
    csv_path: Option<PathBuf>,
    endpoints: EndpointArgs,
) -> Result<()> {
    criteria.validate().context("Invalid search input")?;

    let (crossref, summarizer) = build_clients(&endpoints)?;
    let session = Session::new(crossref, summarizer, api_key);

    let mut outcome = session.search(&criteria, rows).await;
    if !no_summary {
        session.summarize_panels(&mut outcome).await;
    }

    print!("{}", render::render_outcome(&outcome));

    if let Some(path) = csv_path {
        export::save_csv(&path, outcome.records())
            .with_context(|| format!("Failed to save CSV to {}", path.display()))?;
    }

    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(host: String, port: u16, endpoints: EndpointArgs) -> Result<()> {
    info!(host = %host, port = port, "Starting HTTP server");

    let (crossref, summarizer) = build_clients(&endpoints)?;

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    println!("Listening on http://{}", addr);

    server::serve(addr, AppState::new(crossref, summarizer))
        .await
        .context("Server error")?;

    Ok(())
}
