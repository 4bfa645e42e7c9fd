//! Detection log view model and its client-side filter

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::format::{end_of_local_day, format_percent, start_of_local_day};
use crate::models::Detection;
use crate::ripeness::RipenessStatus;

/// Filter controls of the detection log. All active filters combine with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetectionFilter {
    /// Exact field number of the related plant
    #[serde(default)]
    pub field: Option<i32>,
    /// Case-insensitive substring of the related plant code
    #[serde(default)]
    pub plant: Option<String>,
    /// Inclusive lower bound: local midnight of this day
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound: 23:59:59 local time of this day
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl DetectionFilter {
    pub fn matches(&self, detection: &Detection) -> bool {
        if let Some(field) = self.field {
            if detection.field_number() != Some(field) {
                return false;
            }
        }

        if let Some(needle) = self.code_needle() {
            let code = detection
                .plant
                .as_ref()
                .map(|p| p.code.to_uppercase())
                .unwrap_or_default();
            if !code.contains(&needle) {
                return false;
            }
        }

        // A row whose time did not parse cannot satisfy a date bound
        let observed = detection.timestamp.instant();
        if let Some(from) = self.from {
            if !observed.map_or(false, |at| at >= start_of_local_day(from)) {
                return false;
            }
        }

        if let Some(to) = self.to {
            if !observed.map_or(false, |at| at <= end_of_local_day(to)) {
                return false;
            }
        }

        true
    }

    pub fn apply<'a>(&self, detections: &'a [Detection]) -> Vec<&'a Detection> {
        detections.iter().filter(|d| self.matches(d)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_none() && self.code_needle().is_none() && self.from.is_none() && self.to.is_none()
    }

    fn code_needle(&self) -> Option<String> {
        self.plant
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase)
    }
}

/// One row of a detection table (detection log and dashboard "latest")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionRow {
    pub id: i64,
    pub timestamp_label: String,
    pub plant_label: String,
    pub field_label: String,
    pub row_label: String,
    pub position_label: String,
    pub ripe_count: i32,
    pub semi_ripe_count: i32,
    pub unripe_count: i32,
    pub total: i32,
    pub percentage_label: String,
    pub status: RipenessStatus,
    pub recommendation: String,
    pub image_url: Option<String>,
}

impl From<&Detection> for DetectionRow {
    fn from(detection: &Detection) -> Self {
        let plant = detection.plant.as_ref();
        let label = |prefix: &str, value: Option<i32>| match value {
            Some(v) => format!("{} {}", prefix, v),
            None => format!("{} -", prefix),
        };

        Self {
            id: detection.id,
            timestamp_label: detection.timestamp.label(),
            plant_label: detection.plant_label(),
            field_label: label("Campo", plant.map(|p| p.field_number)),
            row_label: label("Fila", plant.and_then(|p| p.row_number)),
            position_label: label("Pos.", plant.and_then(|p| p.position_number)),
            ripe_count: detection.ripe_count,
            semi_ripe_count: detection.semi_ripe_count,
            unripe_count: detection.unripe_count,
            total: detection.total(),
            percentage_label: format_percent(detection.ripe_percentage),
            status: detection.status(),
            recommendation: detection
                .harvest_recommendation
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            image_url: detection.image_url.clone(),
        }
    }
}

/// Render model of the detection log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionLogView {
    pub filter: DetectionFilter,
    pub rows: Vec<DetectionRow>,
    /// e.g. `40 detecciones`
    pub count_label: String,
    pub no_matches: bool,
    pub field_options: Vec<i32>,
}

/// Build the detection log from the full, already-fetched detection list
pub fn build_detection_log(
    detections: &[Detection],
    filter: DetectionFilter,
    field_options: Vec<i32>,
) -> DetectionLogView {
    let rows: Vec<DetectionRow> = filter
        .apply(detections)
        .into_iter()
        .map(DetectionRow::from)
        .collect();
    DetectionLogView {
        count_label: format!("{} detecciones", rows.len()),
        no_matches: rows.is_empty(),
        filter,
        rows,
        field_options,
    }
}
