use anyhow::{Context, Result};
use domain::store::{EnrollmentStore, InMemoryEnrollmentStore};
use persistence::repositories::EnrollmentRepository;
use std::sync::Arc;
use tracing::{info, warn};

use course_access_api::{
    app,
    config::{Config, StoreBackendKind},
    middleware,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    middleware::init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Course Access API v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    let addr = config.socket_addr()?;
    let app = app::create_app(config, store);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &Config) -> Result<Option<Arc<dyn EnrollmentStore>>> {
    match config.store.backend {
        StoreBackendKind::Postgres => {
            let pool = persistence::db::create_pool(&config.database.pool_config())
                .await
                .context("Failed to connect to database")?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            let store: Arc<dyn EnrollmentStore> = Arc::new(EnrollmentRepository::new(pool));
            Ok(Some(store))
        }
        StoreBackendKind::Memory => {
            warn!("Using in-memory record store; data is lost on restart");
            let store: Arc<dyn EnrollmentStore> = Arc::new(InMemoryEnrollmentStore::new());
            Ok(Some(store))
        }
        StoreBackendKind::Disabled => Ok(None),
    }
}
