//! jobscout binary: drive a controlled browser through a job search and
//! print the extracted listings.

use anyhow::Result;
use clap::Parser;
use jobscout::pipeline::{self, RunConfig};
use jobscout::renderer::chromium::ChromiumRenderer;
use jobscout::renderer::Renderer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "jobscout",
    about = "jobscout — structured extraction of job listings from live rendered pages",
    version
)]
struct Cli {
    /// Search page to start from
    #[arg(default_value = "https://www.google.com/search?q=software+engineer+jobs")]
    url: String,

    /// Drill into every listing's detail pane (default: summary of the
    /// last 5 records)
    #[arg(long)]
    full: bool,

    /// Cap the number of detail drill-down iterations
    #[arg(long)]
    limit: Option<usize>,

    /// Bootstrap navigation timeout in milliseconds
    #[arg(long, default_value = "30000")]
    timeout_ms: u64,

    /// Enable verbose/debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "jobscout=debug"
    } else {
        "jobscout=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let renderer = match ChromiumRenderer::new().await {
        Ok(renderer) => renderer,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let config = RunConfig {
        search_url: cli.url,
        full_detail: cli.full,
        detail_limit: cli.limit,
        nav_timeout_ms: cli.timeout_ms,
    };

    let result = pipeline::run(&renderer, &config).await;
    let _ = renderer.shutdown().await;

    match result {
        Ok(run_result) => {
            print!("{}", pipeline::render_report(&run_result));
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
