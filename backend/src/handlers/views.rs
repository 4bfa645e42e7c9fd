//! HTML fragment handlers
//!
//! Same view models as the JSON endpoints, rendered through `shared::render`.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;

use super::{DetectionParams, FieldParams, PlantParams};
use crate::error::AppResult;
use crate::services::{DashboardService, DetectionService, GreenhouseService, PlantService};
use crate::AppState;
use shared::render;

fn html(result: AppResult<String>) -> Response {
    match result {
        Ok(markup) => Html(markup).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn dashboard_markup(state: &AppState, params: FieldParams) -> AppResult<String> {
    let service = DashboardService::new(state.store.clone(), state.config.dashboard.recent_limit);
    let view = service.dashboard(params.field()?, Utc::now()).await?;
    Ok(render::render_dashboard(&view))
}

async fn plants_markup(state: &AppState, params: PlantParams) -> AppResult<String> {
    let view = PlantService::new(state.store.clone())
        .registry(params.into_filter()?)
        .await?;
    Ok(render::render_plant_rows(&view))
}

async fn detections_markup(state: &AppState, params: DetectionParams) -> AppResult<String> {
    let view = DetectionService::new(state.store.clone())
        .log(params.into_filter()?)
        .await?;
    Ok(render::render_detection_rows(&view))
}

async fn map_markup(state: &AppState, params: FieldParams) -> AppResult<String> {
    let view = GreenhouseService::new(state.store.clone())
        .map(params.field()?)
        .await?;
    Ok(render::render_greenhouse(&view))
}

pub async fn dashboard_fragment(
    State(state): State<AppState>,
    Query(params): Query<FieldParams>,
) -> impl IntoResponse {
    html(dashboard_markup(&state, params).await)
}

/// `<tbody>` rows of the plant registry
pub async fn plants_fragment(
    State(state): State<AppState>,
    Query(params): Query<PlantParams>,
) -> impl IntoResponse {
    html(plants_markup(&state, params).await)
}

/// `<tbody>` rows of the detection log
pub async fn detections_fragment(
    State(state): State<AppState>,
    Query(params): Query<DetectionParams>,
) -> impl IntoResponse {
    html(detections_markup(&state, params).await)
}

pub async fn map_fragment(
    State(state): State<AppState>,
    Query(params): Query<FieldParams>,
) -> impl IntoResponse {
    html(map_markup(&state, params).await)
}
