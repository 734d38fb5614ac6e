use anyhow::Context;
use chrono::Duration as ChronoDuration;
use clap::{Parser, Subcommand};
use payout_ledger::app::auth::{Claims, JwtKeys, Role};
use payout_ledger::services::scheduler;
use payout_ledger::store::seed::SeedData;
use payout_ledger::store::MemoryStore;
use payout_ledger::{build_router, AppState, Config};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "api", about = "Commission ledger and provider payout service")]
struct Cli {
    /// TOML config file
    #[arg(long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,
    #[arg(long)]
    port: Option<u16>,
    /// JSON file with providers and bookings
    #[arg(long)]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign a bearer token with the configured secret
    IssueToken {
        #[arg(long)]
        sub: String,
        #[arg(long, default_value = "admin")]
        role: Role,
        #[arg(long)]
        provider_id: Option<String>,
        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server_port = port;
    }
    if let Some(seed) = cli.seed {
        config.seed_file = Some(seed);
    }

    if let Some(Command::IssueToken {
        sub,
        role,
        provider_id,
        ttl_hours,
    }) = cli.command
    {
        let claims = Claims::new(sub, role, provider_id, ChronoDuration::hours(ttl_hours));
        let token = JwtKeys::from_secret(&config.jwt_secret).issue(&claims)?;
        println!("{token}");
        return Ok(());
    }

    serve(config).await
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Starting payout ledger on port {}", config.server_port);

    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &config.seed_file {
        SeedData::from_file(path)?.apply(&store);
    }

    let state = AppState::new(&config, store);

    if config.payout_schedule_interval_secs > 0 {
        scheduler::spawn(
            state.batcher.clone(),
            Duration::from_secs(config.payout_schedule_interval_secs),
        );
    }

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("server error")
}
