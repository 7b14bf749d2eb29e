//! SeedBridge - MCP server that turns tool calls into REST requests

use anyhow::Context;
use clap::Parser;
use seedbridge_dispatch::{Dispatcher, FakeValueProducer, RandomFaker, ReqwestTransport};
use seedbridge_foundation::ConfigLoader;
use seedbridge_server::{McpServer, ToolSurface};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// SeedBridge - bridge MCP tool calls to a configured REST API
#[derive(Parser, Debug)]
#[command(name = "seedbridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Endpoint configuration file (JSON, or TOML by extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the target API (overrides config and SEEDBRIDGE_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Maximum attempts per HTTP call, first attempt included
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Validate the configuration, print the endpoints and exit
    #[arg(long)]
    check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the protocol; logs go to stderr
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = args.config {
        loader = loader.path(path);
    }
    if let Some(url) = args.base_url {
        loader = loader.base_url(url);
    }
    if let Some(attempts) = args.max_attempts {
        loader = loader.max_attempts(attempts);
    }
    let config = loader.load().context("failed to load configuration")?;

    if args.check {
        println!("{}", config.base_url());
        for (name, endpoint) in &config.endpoints {
            println!(
                "  {:<20} {} {}",
                name,
                endpoint.method.as_deref().unwrap_or("?"),
                endpoint.path.as_deref().unwrap_or("?")
            );
        }
        return Ok(());
    }

    let transport =
        ReqwestTransport::from_config(&config.http).context("failed to build HTTP client")?;
    let producer: Arc<dyn FakeValueProducer> = Arc::new(RandomFaker::new());
    let dispatcher = Dispatcher::with_parts(&config, Arc::new(transport), producer.clone())
        .context("failed to build endpoint registry")?;

    info!("SeedBridge {} targeting {}", env!("CARGO_PKG_VERSION"), config.base_url());

    let server = McpServer::new(ToolSurface::new(dispatcher, producer, config.tools.clone()));
    server.serve_stdio().await?;

    info!("SeedBridge stopped");
    Ok(())
}
