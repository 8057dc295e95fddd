use anyhow::Result;
use axum::Router;
use clap::Parser;
use corpusvec_core::{CorpusConfig, MAX_TOKEN_LEN};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Corpus directory path
    #[arg(long, short = 'c')]
    corpus: PathBuf,
    /// Stop words file
    #[arg(long, short = 's')]
    stopwords: Option<PathBuf>,
    /// Longest token kept
    #[arg(long, default_value_t = MAX_TOKEN_LEN)]
    max_token_len: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, short = 'l', default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let mut config = CorpusConfig::new(args.corpus).with_max_token_len(args.max_token_len);
    if let Some(stopwords) = args.stopwords {
        config = config.with_stopwords(stopwords);
    }
    let app: Router = tokio::task::spawn_blocking(move || build_app(config)).await??;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
