//! Valve Condition Monitor - Prediction Service
//!
//! Serves a pre-trained valve-condition classifier over HTTP. The model is
//! fetched from the model registry once at startup; after that every request
//! is a pure read of the loaded weights.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 VALVE PREDICTION SERVICE                 │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌────────────────┐  │
//! │  │  HTTP API │   │  Classifier  │   │ Model Registry │  │
//! │  │  (Axum)   │──▶│  (ONNX)      │◀──│ (startup only) │  │
//! │  └───────────┘   └──────────────┘   └────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod model;
mod registry;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use model::ValveModel;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valve_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; every registry variable is required
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    tracing::info!("Valve prediction service starting...");
    tracing::info!("Model registry: {}", config.registry_uri);

    // Fetch the artifact and bring up the session
    let artifact = registry::fetch_artifact(&config).await?;
    let model = ValveModel::load(artifact)?;
    tracing::info!(
        "Model loaded: {} (resampling method: {}, input length: {})",
        model.metadata().name,
        model.metadata().resampling_method,
        model.metadata().input_length
    );

    let state = AppState {
        model: Arc::new(model),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("🚀 Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ValveModel>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route(
            "/get_resampling_method",
            get(handlers::method::get_resampling_method),
        )
        .route(
            "/predict_from_cycle",
            post(handlers::predict::predict_from_cycle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
