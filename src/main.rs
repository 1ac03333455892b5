use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use patou_api::app::{build_router, AppState};
use patou_api::config::{self, AppConfig};
use patou_api::database::{
    DatabaseError, DatabaseManager, DecisionStore, MemoryDecisionStore, PgDecisionStore, UnconfiguredStore,
};

/// Patou API server
#[derive(Parser)]
#[command(name = "patou-api", version)]
struct Args {
    #[arg(long, help = "Bind address (overrides PATOU_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Port (overrides PATOU_PORT / PORT)")]
    port: Option<u16>,

    #[arg(long, env = "PATOU_FIXTURES", help = "Serve decisions from a JSON file instead of Postgres")]
    fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ADMIN_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "patou_api=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config: AppConfig = config::config().clone();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting Patou API in {:?} mode", config.environment);

    let store = open_store(&config, args.fixtures)?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Patou API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn open_store(config: &AppConfig, fixtures: Option<PathBuf>) -> anyhow::Result<Arc<dyn DecisionStore>> {
    if let Some(path) = fixtures {
        tracing::warn!("Serving fixture decisions from {}; Postgres is not used", path.display());
        return Ok(Arc::new(MemoryDecisionStore::from_json_file(path)?));
    }

    let pool = match DatabaseManager::connect_lazy(&config.database) {
        Ok(pool) => pool,
        Err(DatabaseError::ConfigMissing(setting)) => {
            tracing::warn!("{} is not set; admin listing will answer 500", setting);
            return Ok(Arc::new(UnconfiguredStore::new(setting)));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Arc::new(PgDecisionStore::new(pool, config.database.decisions_view.clone())?))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
