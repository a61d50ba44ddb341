use anyhow::Result;
use axum::Router;
use clap::Parser;
use engine::config::{DEFAULT_GENRE_WEIGHT, DEFAULT_OVERVIEW_WEIGHT};
use engine::{EngineCache, EngineConfig, Scoring};
use server::build_app_with;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Movie corpus path (CSV, JSON, JSONL file or directory)
    #[arg(long, default_value = "./sample_data/movies.csv")]
    data: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Blend overview similarity with genre overlap
    #[arg(long, default_value_t = false)]
    hybrid: bool,
    #[arg(long, default_value_t = DEFAULT_OVERVIEW_WEIGHT, requires = "hybrid")]
    overview_weight: f32,
    #[arg(long, default_value_t = DEFAULT_GENRE_WEIGHT, requires = "hybrid")]
    genre_weight: f32,
}

impl Args {
    fn config(&self) -> EngineConfig {
        if self.hybrid {
            let scoring = Scoring::Hybrid { overview_weight: self.overview_weight, genre_weight: self.genre_weight };
            EngineConfig::new().with_scoring(scoring)
        } else {
            EngineConfig::new()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app_with(args.data.clone(), args.config(), Arc::new(EngineCache::new()))?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, data = %args.data, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_flags_map_to_hybrid_scoring() {
        let args = Args::parse_from(["server", "--hybrid", "--overview-weight", "0.6", "--genre-weight", "0.4"]);
        assert_eq!(args.config().scoring, Scoring::Hybrid { overview_weight: 0.6, genre_weight: 0.4 });

        let args = Args::parse_from(["server", "--hybrid"]);
        assert_eq!(args.config().scoring, Scoring::hybrid());

        assert_eq!(Args::parse_from(["server"]).config().scoring, Scoring::Combined);
        assert!(Args::try_parse_from(["server", "--genre-weight", "0.5"]).is_err());
    }
}
