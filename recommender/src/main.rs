use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use engine::{Corpus, EngineCache, EngineConfig, IdfMode, Recommendation, Scoring, SimilarityEngine, DEFAULT_K};
use engine::config::{DEFAULT_GENRE_WEIGHT, DEFAULT_OVERVIEW_WEIGHT};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "recommender")]
#[command(about = "Recommend similar movies with TF-IDF content similarity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the movies most similar to one title
    Recommend {
        #[command(flatten)]
        engine: EngineArgs,
        /// Title to find neighbours for (exact match)
        #[arg(long)]
        title: String,
        /// Number of recommendations
        #[arg(long, default_value_t = DEFAULT_K)]
        k: usize,
    },
    /// Prompt for titles on stdin until an empty line or EOF
    Interactive {
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(long, default_value_t = DEFAULT_K)]
        k: usize,
    },
    /// List every title in the corpus
    List {
        /// Input path (CSV, JSON, JSONL file or directory)
        #[arg(long)]
        input: String,
    },
    /// Print corpus and vocabulary sizes
    Stats {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Input path (CSV, JSON, JSONL file or directory)
    #[arg(long)]
    input: String,
    /// Use plain IDF = ln(N/df) instead of smoothed ln(1 + N/df)
    #[arg(long, default_value_t = false)]
    plain_idf: bool,
    /// Use raw term counts instead of 1 + ln(tf)
    #[arg(long, default_value_t = false)]
    raw_tf: bool,
    /// Disable English stemming
    #[arg(long, default_value_t = false)]
    no_stem: bool,
    /// Blend overview similarity with genre overlap
    #[arg(long, default_value_t = false)]
    hybrid: bool,
    #[arg(long, default_value_t = DEFAULT_OVERVIEW_WEIGHT, requires = "hybrid")]
    overview_weight: f32,
    #[arg(long, default_value_t = DEFAULT_GENRE_WEIGHT, requires = "hybrid")]
    genre_weight: f32,
}

impl EngineArgs {
    fn config(&self) -> EngineConfig {
        let scoring = if self.hybrid {
            Scoring::Hybrid { overview_weight: self.overview_weight, genre_weight: self.genre_weight }
        } else {
            Scoring::Combined
        };
        EngineConfig::new()
            .with_idf(if self.plain_idf { IdfMode::Plain } else { IdfMode::Smoothed })
            .with_sublinear_tf(!self.raw_tf)
            .with_stemming(!self.no_stem)
            .with_scoring(scoring)
    }

    fn build(&self, cache: &EngineCache) -> Result<Arc<SimilarityEngine>> {
        let corpus = Corpus::load(&self.input).with_context(|| format!("loading corpus from {}", self.input))?;
        let engine = cache.get_or_build(Arc::new(corpus), self.config())?;
        Ok(engine)
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let cache = EngineCache::new();

    match cli.command {
        Commands::Recommend { engine, title, k } => {
            let engine = engine.build(&cache)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            match engine.recommend(&title, k) {
                Ok(recs) => print_recommendations(&mut out, &title, &recs)?,
                Err(e) => writeln!(out, "{e}")?,
            }
            Ok(())
        }
        Commands::Interactive { engine, k } => {
            let engine = engine.build(&cache)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            run_interactive(&engine, k, stdin.lock(), stdout.lock())
        }
        Commands::List { input } => {
            let corpus = Corpus::load(&input).with_context(|| format!("loading corpus from {input}"))?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for record in corpus.records() {
                writeln!(out, "{}", record.title)?;
            }
            Ok(())
        }
        Commands::Stats { engine } => {
            let engine = engine.build(&cache)?;
            println!("movies: {}", engine.corpus().len());
            println!("vocabulary: {}", engine.vocabulary().len());
            println!("tf-idf matrix shape: ({}, {})", engine.corpus().len(), engine.vocabulary().len());
            println!("corpus digest: {}", engine.corpus().digest());
            Ok(())
        }
    }
}

fn print_recommendations<W: Write>(out: &mut W, title: &str, recs: &[Recommendation]) -> io::Result<()> {
    writeln!(out, "Recommendations for: {title}")?;
    if recs.is_empty() {
        writeln!(out, "  (no other movies in corpus)")?;
    }
    for (rank, rec) in recs.iter().enumerate() {
        writeln!(out, "{:>3}. {} ({:.3})", rank + 1, rec.title, rec.score)?;
    }
    Ok(())
}

/// Unknown titles are reported and the prompt repeats.
fn run_interactive<R: BufRead, W: Write>(engine: &SimilarityEngine, k: usize, input: R, mut out: W) -> Result<()> {
    let mut lines = input.lines();
    loop {
        write!(out, "movie title (empty to quit)> ")?;
        out.flush()?;
        let Some(line) = lines.next() else { break };
        let title = line?;
        let title = title.trim();
        if title.is_empty() {
            break;
        }
        match engine.recommend(title, k) {
            Ok(recs) => print_recommendations(&mut out, title, &recs)?,
            Err(e) => {
                tracing::debug!(title, "title not found");
                writeln!(out, "{e}, try again")?;
            }
        }
    }
    writeln!(out)?;
    Ok(())
}
