//! Plant registry HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::PlantParams;
use crate::services::{PlantService, QrService};
use crate::AppState;
use shared::models::PlantInput;

/// `?confirm=true` on delete
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

/// Plant registry rows narrowed by field and search text
pub async fn list_plants(
    State(state): State<AppState>,
    Query(params): Query<PlantParams>,
) -> impl IntoResponse {
    let filter = match params.into_filter() {
        Ok(filter) => filter,
        Err(e) => return e.into_response(),
    };
    let service = PlantService::new(state.store.clone());

    match service.registry(filter).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific plant
pub async fn get_plant(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let service = PlantService::new(state.store.clone());

    match service.get_plant(id).await {
        Ok(plant) => (StatusCode::OK, Json(plant)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new plant with the next sequential code
pub async fn create_plant(
    State(state): State<AppState>,
    Json(input): Json<PlantInput>,
) -> impl IntoResponse {
    let service = PlantService::new(state.store.clone());

    match service.create_plant(input).await {
        Ok(plant) => (StatusCode::CREATED, Json(plant)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a plant
pub async fn update_plant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PlantInput>,
) -> impl IntoResponse {
    let service = PlantService::new(state.store.clone());

    match service.update_plant(id, input).await {
        Ok(plant) => (StatusCode::OK, Json(plant)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a plant after explicit confirmation
pub async fn delete_plant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<DeleteParams>,
) -> impl IntoResponse {
    let service = PlantService::new(state.store.clone());

    match service.delete_plant(id, params.confirm).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Download the QR image of a plant as `QR_{code}.png`
pub async fn download_qr(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let service = QrService::new(state.store.clone(), state.qr.clone());

    match service.download(id).await {
        Ok(download) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, download.image.content_type),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", download.filename),
                ),
            ],
            download.image.bytes,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Distinct field numbers for every filter control
pub async fn list_fields(State(state): State<AppState>) -> impl IntoResponse {
    let service = PlantService::new(state.store.clone());

    match service.fields().await {
        Ok(fields) => (StatusCode::OK, Json(serde_json::json!({ "fields": fields }))).into_response(),
        Err(e) => e.into_response(),
    }
}
