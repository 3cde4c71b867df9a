//! Chat Stream Hub - Main Entry Point
//!
//! Loads configuration, opens the chat store and serves the API.
//!
//! Run with: cargo run -- --config chat-stream-hub.toml

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use chat_stream_hub::config;
use chat_stream_hub::handlers::{build_router, AppState};
use chat_stream_hub::infrastructure::open_store;

#[derive(Debug, Parser)]
#[command(name = "chat-stream-hub", version, about)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "CHAT_STREAM_HUB_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set panic hook to print full backtrace
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        eprintln!("\n=== PANIC CAUGHT ===");
        eprintln!("Panic info: {}", panic_info);
        eprintln!("Backtrace:\n{}", backtrace);
        eprintln!("=== END PANIC ===\n");
    }));

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    tracing::info!("Starting Chat Stream Hub...");

    let mut config = config::load(args.config.as_deref()).context("failed to load config")?;
    if let Some(port) = args.port {
        config.server.port = port;
        config.validate().context("invalid --port")?;
    }

    let store = open_store(&config.storage)
        .await
        .context("failed to open chat store")?;

    let state = AppState::from_config(&config, store);
    let app = build_router(state);

    let ip = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host: {}", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
