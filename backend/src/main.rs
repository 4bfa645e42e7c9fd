//! MADUREX - Backend Server
//!
//! Strawberry ripeness monitoring: serves the dashboard, plant registry,
//! detection log and greenhouse map over the plant and detection store.

use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod models;
mod routes;
mod services;
mod store;

pub use config::Config;

use error::AppError;
use external::QrImageClient;
use store::{SeedData, Store};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    pub qr: QrImageClient,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        let qr = QrImageClient::new(&config.qr);
        Self {
            store,
            config: Arc::new(config),
            qr,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "madurex_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;
    config.validate().map_err(AppError::Configuration)?;

    tracing::info!("Starting MADUREX server");
    tracing::info!("Environment: {}", config.environment);

    let store = Store::connect(&config.store).await?;
    tracing::info!("Store backend: {}", store.backend_name());

    // Demo rows are only loaded into the memory backend
    if let (Store::Memory(memory), Some(path)) = (&store, &config.store.seed_file) {
        let raw = tokio::fs::read_to_string(path).await?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        tracing::info!(
            plants = seed.plants.len(),
            detections = seed.detections.len(),
            "Seeding memory store from {}",
            path
        );
        memory.seed(seed).await;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Build application
    let app = create_app(AppState::new(store, config));

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .nest("/views", routes::view_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "MADUREX Strawberry Monitoring API v1"
}
