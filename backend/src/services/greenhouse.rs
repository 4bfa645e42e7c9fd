//! Greenhouse map service

use super::read_error;
use crate::error::AppResult;
use crate::store::{DetectionQuery, Store};
use shared::aggregation::field_options;
use shared::greenhouse::{build_greenhouse, GreenhouseView};

const VIEW: &str = "map";

#[derive(Clone)]
pub struct GreenhouseService {
    store: Store,
}

impl GreenhouseService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Grid of every field (or only `field`) colored by each plant's latest detection
    pub async fn map(&self, field: Option<i32>) -> AppResult<GreenhouseView> {
        let plants = self.store.list_plants(None).await.map_err(read_error(VIEW))?;
        let detections = self
            .store
            .list_detections(&DetectionQuery::newest_first().in_field(field))
            .await
            .map_err(read_error(VIEW))?;

        let options = field_options(&plants);
        Ok(build_greenhouse(&plants, &detections, field, options))
    }
}
