//! Animation streaming HTTP endpoints
//!
//! Each configured product is served as a `multipart/x-mixed-replace`
//! stream: a browser image element pointed at `/stream/{product}` renders
//! each frame as it arrives, replacing the previous one.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::info;

use heliocast_core::stream::multipart;

use crate::http::{AppError, AppResult, AppState};

/// Create streaming router
///
/// Routes:
/// - GET /products - list configured animation products
/// - GET /stream/{product} - endless multipart replay of the product
pub fn create_stream_router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/stream/{product}", get(handle_stream))
}

/// One entry of the product listing
#[derive(Debug, Serialize)]
struct ProductInfo {
    slug: String,
    label: String,
    stream_path: String,
}

/// List configured animation products
async fn list_products(State(state): State<AppState>) -> Json<Vec<ProductInfo>> {
    let mut products: Vec<ProductInfo> = state
        .pipelines
        .values()
        .map(|pipeline| ProductInfo {
            slug: pipeline.slug().to_string(),
            label: pipeline.label().to_string(),
            stream_path: format!("/stream/{}", pipeline.slug()),
        })
        .collect();
    products.sort_by(|a, b| a.slug.cmp(&b.slug));
    Json(products)
}

/// Handle a streaming request
///
/// GET /stream/{product}
///
/// Opens an independent session for this viewer: its own feed fetch, its
/// own frame sequence, its own pacing. The response body ends when the
/// session closes (viewer disconnect or terminal upstream failure).
async fn handle_stream(
    Path(product): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let pipeline = state
        .pipelines
        .get(&product)
        .ok_or_else(|| AppError::not_found(format!("unknown product: {product}")))?;

    info!(product = %pipeline.slug(), "stream request");

    let (rx, _handle) = pipeline.open_session();

    let body = Body::from_stream(UnboundedReceiverStream::new(rx));

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, multipart::MIME_TYPE)
        .header(header::CACHE_CONTROL, "no-cache, no-store")
        .header("X-Accel-Buffering", "no")
        .header(header::CONNECTION, "keep-alive")
        .body(body)
        .map_err(|_| AppError::internal_server_error("Failed to build response"))?
        .into_response())
}
