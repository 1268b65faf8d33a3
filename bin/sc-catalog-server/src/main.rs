//! Service Catalog Server
//!
//! REST API for registering services, provisioning instances and sharing
//! them between teams.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SC_CONFIG` | - | Path to a TOML configuration file |
//! | `SC_API_PORT` | `8080` | HTTP API port |
//! | `SC_STORE_BACKEND` | `memory` | `memory` or `mongo` |
//! | `SC_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `SC_MONGO_DB` | `service_catalog` | MongoDB database name |
//! | `SC_LOG_JSON` | `false` | Emit JSON log lines |
//! | `RUST_LOG` | `info` | Log level |

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{response::Json, routing::get, Router};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sc_catalog::api::{catalog_router, ApiState, CatalogApiDoc};
use sc_catalog::repository::{CatalogStore, MemoryStore, MongoStore};
use sc_catalog::seed::CatalogSeeder;
use sc_config::{CatalogConfig, StoreBackend};

/// Service Catalog Server
#[derive(Parser, Debug)]
#[command(name = "sc-catalog-server")]
#[command(about = "Service catalog with team-scoped access control")]
struct Args {
    /// TOML configuration file
    #[arg(long, env = "SC_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP API port, overrides the configuration
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CatalogConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CatalogConfig::from_env()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_logging(config.logging.json);
    info!("Starting Service Catalog Server");

    let store = open_store(&config).await?;

    let report = CatalogSeeder::new(store.clone()).seed(&config.seed).await?;
    if report.users_created > 0 || report.teams_created > 0 {
        info!(
            users = report.users_created,
            teams = report.teams_created,
            "Seed data created"
        );
    }

    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(catalog_router(ApiState::new(store)))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", CatalogApiDoc::openapi()))
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Service Catalog Server shutdown complete");
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn open_store(config: &CatalogConfig) -> Result<Arc<dyn CatalogStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Ok(MemoryStore::new_shared())
        }
        StoreBackend::Mongo => {
            info!(url = %config.store.mongo_url, db = %config.store.mongo_db, "Connecting to MongoDB");
            let client = mongodb::Client::with_uri_str(&config.store.mongo_url).await?;
            let db = client.database(&config.store.mongo_db);
            Ok(Arc::new(MongoStore::new(&db)))
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received...");
}
