use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use sift_core::corpus::{load_documents, sample_corpus};
use sift_core::{EngineConfig, SearchEngine, StopwordCleaner, Tokenizer, WhitespaceTokenizer, WordTokenizer};
use sift_server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sift-server")]
#[command(about = "Serve ranked full-text search over an in-memory corpus", long_about = None)]
struct Args {
    /// Seed corpus (.json array/object or .jsonl); built-in sample if omitted
    #[arg(long)]
    seed: Option<PathBuf>,
    /// Engine configuration as JSON; defaults if omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Split on whitespace instead of Unicode word runs
    #[arg(long, default_value_t = false)]
    whitespace: bool,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
            EngineConfig::from_json(&text).with_context(|| format!("parsing config {}", p.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    let seed = match &args.seed {
        Some(path) => load_documents(path)?,
        None => sample_corpus(),
    };
    let tokenizer: Arc<dyn Tokenizer> = if args.whitespace {
        Arc::new(WhitespaceTokenizer)
    } else {
        Arc::new(WordTokenizer::new())
    };
    let engine = SearchEngine::new(config, tokenizer, Arc::new(StopwordCleaner), seed)?;

    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    if admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set; ingestion routes are disabled");
    }
    let app: Router = build_app(Arc::new(engine), admin_token);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
