//! Route definitions for the MADUREX server

use axum::{routing::get, Router};

use crate::{handlers, handlers::views, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/fields", get(handlers::list_fields))
        .nest("/plants", plant_routes())
        .route("/detections", get(handlers::list_detections))
        .route("/map", get(handlers::get_map))
}

/// Plant registry routes
fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plants).post(handlers::create_plant))
        .route(
            "/:id",
            get(handlers::get_plant)
                .put(handlers::update_plant)
                .delete(handlers::delete_plant),
        )
        .route("/:id/qr", get(handlers::download_qr))
}

/// HTML fragments, one per view
pub fn view_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(views::dashboard_fragment))
        .route("/plants", get(views::plants_fragment))
        .route("/detections", get(views::detections_fragment))
        .route("/map", get(views::map_fragment))
}
