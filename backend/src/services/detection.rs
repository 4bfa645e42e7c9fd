//! Detection log service

use super::read_error;
use crate::error::AppResult;
use crate::store::{DetectionQuery, Store};
use shared::detection_log::{build_detection_log, DetectionFilter, DetectionLogView};

const VIEW: &str = "detections";

#[derive(Clone)]
pub struct DetectionService {
    store: Store,
}

impl DetectionService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Every detection, newest first, narrowed by `filter`
    pub async fn log(&self, filter: DetectionFilter) -> AppResult<DetectionLogView> {
        let detections = self
            .store
            .list_detections(&DetectionQuery::newest_first())
            .await
            .map_err(read_error(VIEW))?;
        let field_options = self.store.list_fields().await.map_err(read_error(VIEW))?;

        tracing::debug!(total = detections.len(), ?filter, "Filtering detection log");
        Ok(build_detection_log(&detections, filter, field_options))
    }
}
