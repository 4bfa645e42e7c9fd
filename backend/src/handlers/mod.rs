//! HTTP request handlers for the MADUREX server

pub mod dashboard;
pub mod detection;
pub mod greenhouse;
pub mod health;
pub mod plant;
pub mod views;

pub use dashboard::*;
pub use detection::*;
pub use greenhouse::*;
pub use health::*;
pub use plant::*;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use shared::detection_log::DetectionFilter;
use shared::registry::PlantFilter;
use shared::validation::{parse_date_filter, parse_field_filter};

fn parse_field_param(value: Option<&str>) -> AppResult<Option<i32>> {
    match value {
        Some(raw) => parse_field_filter(raw).map_err(|msg| AppError::invalid_param("field", msg)),
        None => Ok(None),
    }
}

fn parse_date_param(name: &str, value: Option<&str>) -> AppResult<Option<chrono::NaiveDate>> {
    match value {
        Some(raw) => parse_date_filter(raw).map_err(|msg| AppError::invalid_param(name, msg)),
        None => Ok(None),
    }
}

/// `?field=N` on the dashboard and map
#[derive(Debug, Default, Deserialize)]
pub struct FieldParams {
    pub field: Option<String>,
}

impl FieldParams {
    pub fn field(&self) -> AppResult<Option<i32>> {
        parse_field_param(self.field.as_deref())
    }
}

/// `?field=N&search=s` on the plant registry
#[derive(Debug, Default, Deserialize)]
pub struct PlantParams {
    pub field: Option<String>,
    pub search: Option<String>,
}

impl PlantParams {
    pub fn into_filter(self) -> AppResult<PlantFilter> {
        Ok(PlantFilter {
            field: parse_field_param(self.field.as_deref())?,
            search: self.search,
        })
    }
}

/// `?field=N&plant=s&from=YYYY-MM-DD&to=YYYY-MM-DD` on the detection log
#[derive(Debug, Default, Deserialize)]
pub struct DetectionParams {
    pub field: Option<String>,
    pub plant: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DetectionParams {
    pub fn into_filter(self) -> AppResult<DetectionFilter> {
        Ok(DetectionFilter {
            field: parse_field_param(self.field.as_deref())?,
            plant: self.plant,
            from: parse_date_param("from", self.from.as_deref())?,
            to: parse_date_param("to", self.to.as_deref())?,
        })
    }
}
