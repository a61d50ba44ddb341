mod catalog;

use anyhow::{Context, Result};
use catalog::CatalogClient;
use clap::Parser;
use engine::RawMovie;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "fetcher")]
#[command(about = "Fetch a remote movie catalog into a JSONL corpus")]
struct Cli {
    /// Catalog endpoint; `page` (and `api_key`) are appended as query parameters
    #[arg(long)]
    url: String,
    /// API key sent as the `api_key` query parameter
    #[arg(long, env = "CATALOG_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Maximum number of pages to fetch
    #[arg(long, default_value_t = 5)]
    pages: u32,
    /// Output JSONL file path
    #[arg(long, default_value = "./sample_data/movies.jsonl")]
    output: String,
    /// Request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// User-Agent string sent with every request
    #[arg(long, default_value = "movie-recommender-fetcher/0.1")]
    user_agent: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let client = CatalogClient::new(&args.url, args.api_key.clone(), Duration::from_secs(args.timeout_secs), &args.user_agent)?;
    // nothing is written unless every page succeeded
    let movies = client.fetch_all(args.pages).await?;
    if movies.is_empty() {
        tracing::warn!(url = %args.url, "catalog returned no movies");
    }

    write_jsonl(Path::new(&args.output), &movies)?;
    tracing::info!(movies = movies.len(), output = %args.output, "catalog written");
    Ok(())
}

fn write_jsonl(path: &Path, movies: &[RawMovie]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for movie in movies {
        serde_json::to_writer(&mut out, movie)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
