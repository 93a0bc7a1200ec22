//! searchspell service binary
//!
//! ```bash
//! # HTTP server (default subcommand)
//! searchspell serve --port 8080
//!
//! # One-off question, JSON answer on stdout
//! searchspell ask "which spells open portals?" --only-strange true --reality Earth-616
//! ```
//!
//! ## Environment variables
//!
//! | Variable             | Required | Description                          |
//! |----------------------|----------|--------------------------------------|
//! | `DATABASE_URL`       | Yes      | PostgreSQL (pgvector) connection URL |
//! | `GOOGLE_API_KEY`     | Yes      | Gemini API key                       |
//! | `GEMINI_MODEL`       | No       | Generation model override            |
//! | `GEMINI_EMBED_MODEL` | No       | Embedding model override             |
//! | `LISTEN_ADDR`        | No       | Bind address (e.g. `:8080`)          |
//! | `SEARCHSPELL_CONFIG` | No       | Path to a TOML config file           |

use clap::{Parser, Subcommand};
use searchspell::api::{self, ApiState};
use searchspell::config::AppConfig;
use searchspell::llm::GeminiClient;
use searchspell::store::{create_pool, PgSpellStore};
use searchspell::types::AskRequest;
use searchspell::{Pipeline, StageTimeouts};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "searchspell", version, about = "Grounded answers over the spell wiki")]
struct CliArgs {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// PostgreSQL connection URL
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Bind address (overrides --port)
    #[arg(long, global = true)]
    bind_address: Option<String>,

    /// Port to listen on
    #[arg(long, short, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Answer a single question and print the JSON result
    Ask {
        query: String,
        #[arg(long)]
        top_k: Option<i64>,
        /// Filter on the Doctor Strange flag (`true` or `false`)
        #[arg(long)]
        only_strange: Option<bool>,
        /// Restrict to these realities (repeatable)
        #[arg(long = "reality")]
        realities: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,searchspell=debug")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(url) = args.database_url.filter(|u| !u.trim().is_empty()) {
        config.database.url = url;
    }
    if let Some(addr) = args.bind_address {
        config.server.listen_addr = addr;
    } else if let Some(port) = args.port {
        config.server.listen_addr = format!("0.0.0.0:{port}");
    }
    config.require_credentials()?;

    // ── Capabilities ──────────────────────────────────────────────────────────
    let pool = create_pool(&config.database)?;
    let store = Arc::new(PgSpellStore::new(pool, &config.database.table));
    let gemini = Arc::new(GeminiClient::new(&config.gemini)?);
    let pipeline = Arc::new(Pipeline::new(
        gemini.clone(),
        store.clone(),
        gemini,
        StageTimeouts::from(&config.timeouts),
    ));

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, pipeline, store).await,
        Command::Ask {
            query,
            top_k,
            only_strange,
            realities,
        } => {
            let request = AskRequest {
                query,
                top_k,
                only_strange,
                realities: Some(realities),
            };
            let deadline = Instant::now() + config.timeouts.request();
            let result = pipeline.ask(request, deadline).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

async fn serve(
    config: AppConfig,
    pipeline: Arc<Pipeline>,
    store: Arc<PgSpellStore>,
) -> anyhow::Result<()> {
    let bind = config.server.bind_address();
    let state = ApiState {
        pipeline,
        health: store.clone(),
        catalog: store,
        timeouts: config.timeouts.clone(),
        server: config.server.clone(),
    };

    let app = api::create_app(state);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(
        address = %bind,
        generation_model = %config.gemini.generation_model,
        embedding_model = %config.gemini.embedding_model,
        "searchspell listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("searchspell shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
