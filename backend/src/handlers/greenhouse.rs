//! Greenhouse map HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::FieldParams;
use crate::services::GreenhouseService;
use crate::AppState;

/// Field grids colored by the latest detection of each plant
pub async fn get_map(
    State(state): State<AppState>,
    Query(params): Query<FieldParams>,
) -> impl IntoResponse {
    let field = match params.field() {
        Ok(field) => field,
        Err(e) => return e.into_response(),
    };
    let service = GreenhouseService::new(state.store.clone());

    match service.map(field).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => e.into_response(),
    }
}
