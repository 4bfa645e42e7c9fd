//! Dashboard service

use chrono::{DateTime, Utc};

use super::read_error;
use crate::error::AppResult;
use crate::store::{DetectionQuery, Store};
use shared::dashboard::{build_dashboard, DashboardInput, DashboardView};

const VIEW: &str = "dashboard";

/// Builds the dashboard from the plants and detections of one field, or all
#[derive(Clone)]
pub struct DashboardService {
    store: Store,
    recent_limit: usize,
}

impl DashboardService {
    pub fn new(store: Store, recent_limit: usize) -> Self {
        Self {
            store,
            recent_limit,
        }
    }

    /// Dashboard for `field` (all fields when `None`) as seen at `now`
    pub async fn dashboard(&self, field: Option<i32>, now: DateTime<Utc>) -> AppResult<DashboardView> {
        let plants = self
            .store
            .list_plants(field)
            .await
            .map_err(read_error(VIEW))?;
        // The field filter goes through the plant join so every aggregate sees the same rows
        let detections = self
            .store
            .list_detections(&DetectionQuery::default().in_field(field))
            .await
            .map_err(read_error(VIEW))?;
        let field_options = self.store.list_fields().await.map_err(read_error(VIEW))?;

        tracing::debug!(
            ?field,
            plants = plants.len(),
            detections = detections.len(),
            "Building dashboard"
        );

        Ok(build_dashboard(DashboardInput {
            plants: &plants,
            detections,
            field_filter: field,
            field_options,
            now,
            recent_limit: self.recent_limit,
        }))
    }
}
