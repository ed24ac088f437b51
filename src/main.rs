use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use waitlist_api::app::build_router;
use waitlist_api::config::{self, AppConfig, StoreBackend};
use waitlist_api::middlewares::rate_limiter::spawn_bucket_janitor;
use waitlist_api::state::AppState;
use waitlist_api::store::{MemoryStore, MySqlStore, RegistrantStore};

const BUCKET_IDLE_TTL: Duration = Duration::from_secs(300);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn open_store(cfg: &AppConfig) -> Result<Arc<dyn RegistrantStore>, BoxError> {
    match cfg.store {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; registrations are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::MySql => {
            let url = cfg
                .database_url
                .as_deref()
                .ok_or(config::ConfigError::Missing("DATABASE_URL"))?;
            let pool = config::database::establish_connection(url, cfg.database_max_connections).await?;
            Ok(Arc::new(MySqlStore::new(pool)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load environment variables from .env file (if present)
    dotenv().ok();

    // Initialize tracing for structured logs
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::from_env()?;
    let addr = cfg.socket_addr()?;

    let store = open_store(&cfg).await?;
    tracing::info!(
        backend = ?cfg.store,
        scope = ?cfg.uniqueness_scope(),
        "Registrant store ready"
    );

    let state = AppState::new(&cfg, store);
    let _janitor = spawn_bucket_janitor(state.rate_limiter.clone(), BUCKET_IDLE_TTL);
    let app = build_router(state, &cfg.cors);

    tracing::info!("Listening on http://{}", addr);

    // Start the server and handle shutdown via ctrl-c
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>());

    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
    };

    tokio::select! {
        res = server => {
            res.map_err(|e| format!("Failed to serve application: {e}"))?;
        }
        _ = shutdown_signal => {
            tracing::info!("Shutdown requested; exiting");
        }
    };

    Ok(())
}
