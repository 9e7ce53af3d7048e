// Module: http
// HTTP layer: route registration and shared state for the stream pipelines

pub mod error;
pub mod health;
pub mod stream;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use heliocast_core::StreamPipeline;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Mounted pipelines, keyed by product slug
    pub pipelines: Arc<HashMap<String, StreamPipeline>>,
}

/// Create the HTTP router with all routes
pub fn create_router(pipelines: Vec<StreamPipeline>) -> Router {
    let pipelines: HashMap<String, StreamPipeline> = pipelines
        .into_iter()
        .map(|pipeline| (pipeline.slug().to_string(), pipeline))
        .collect();

    let state = AppState {
        pipelines: Arc::new(pipelines),
    };

    Router::new()
        .merge(health::create_health_router())
        .merge(stream::create_stream_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
