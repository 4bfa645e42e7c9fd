//! Dashboard HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use super::FieldParams;
use crate::services::DashboardService;
use crate::AppState;

/// Dashboard KPIs, charts and latest detections
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<FieldParams>,
) -> impl IntoResponse {
    let field = match params.field() {
        Ok(field) => field,
        Err(e) => return e.into_response(),
    };
    let service = DashboardService::new(state.store.clone(), state.config.dashboard.recent_limit);

    match service.dashboard(field, Utc::now()).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => e.into_response(),
    }
}
