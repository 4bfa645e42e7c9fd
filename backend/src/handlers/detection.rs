//! Detection log HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::DetectionParams;
use crate::services::DetectionService;
use crate::AppState;

/// Detection log narrowed by field, plant code and date range
pub async fn list_detections(
    State(state): State<AppState>,
    Query(params): Query<DetectionParams>,
) -> impl IntoResponse {
    let filter = match params.into_filter() {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };
    let service = DetectionService::new(state.store.clone());

    match service.log(filter).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => e.into_response(),
    }
}
