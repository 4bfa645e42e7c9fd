//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::store::DetectionQuery;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store_backend: String,
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plants: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections: Option<u64>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check store connectivity
    let plants = state.store.count_plants(None).await;
    let detections = state
        .store
        .count_detections(&DetectionQuery::default())
        .await;

    let store_status = match (&plants, &detections) {
        (Ok(_), Ok(_)) => "connected".to_string(),
        _ => "disconnected".to_string(),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_backend: state.store.backend_name().to_string(),
        store: store_status,
        plants: plants.ok(),
        detections: detections.ok(),
    })
}
