//! `createmate` binary: serve the REST API or run a scripted demo session.

mod config;
mod demo;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use config::{CreateMateConfig, StorageBackend};
use createmate_core::UserInput;
use createmate_gateway::GatewayServer;
use createmate_llm::LlmClient;
use createmate_orchestrator::Runtime;
use createmate_storage::{DocumentStore, FileDocumentStore, InMemoryDocumentStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "createmate", about = "CreateMate: multi-agent content scheduling assistant")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "createmate.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the agents and the REST API
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Walk a running server through one session
    Demo {
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        url: String,
        #[arg(long, default_value = "Technology")]
        area: String,
        #[arg(long, default_value = "Event Updates")]
        content_type: String,
        /// Repeat for several keywords
        #[arg(long = "keyword", default_values = ["Ethereum", "Web3"])]
        keywords: Vec<String>,
        #[arg(long, default_value_t = 3)]
        frequency: u8,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = CreateMateConfig::load(&cli.config).await?;
            config.apply_env(|key| std::env::var(key).ok())?;
            serve(config, host, port).await
        }
        Commands::Demo {
            url,
            area,
            content_type,
            keywords,
            frequency,
        } => {
            let input = UserInput {
                area_of_interest: area,
                content_type,
                keywords,
                post_frequency: frequency,
            };
            demo::run(&url, input).await
        }
    }
}

async fn serve(
    config: CreateMateConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    if config.model.api_key.is_empty() {
        warn!(
            provider = ?config.model.provider,
            "No model API key configured; generation requests will fail"
        );
    }

    let store: Arc<dyn DocumentStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryDocumentStore::new()),
        StorageBackend::File => Arc::new(
            FileDocumentStore::new(config.storage.data_dir.clone())
                .await
                .with_context(|| {
                    format!(
                        "Failed to open data directory '{}'",
                        config.storage.data_dir.display()
                    )
                })?,
        ),
    };
    info!(backend = ?config.storage.backend, data_dir = %config.storage.data_dir.display(), "Storage ready");

    let llm = Arc::new(LlmClient::new(config.model.clone()));
    let runtime = Arc::new(Runtime::start(config.runtime_config(), llm, store).await?);
    for (role, address) in runtime.addresses() {
        info!(agent = %role, address = %address, "Agent address");
    }

    let app = GatewayServer::build_with_cors(runtime.clone(), &config.server.cors_origins);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("CreateMate API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await?;

    runtime.shutdown().await;
    Ok(())
}
