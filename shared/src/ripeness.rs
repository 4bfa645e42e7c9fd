//! Ripeness status classification
//!
//! The same thresholds drive the dashboard ready-count and the greenhouse map
//! coloring, so both call sites go through [`classify_ripeness`].

use serde::{Deserialize, Serialize};

/// Ripe percentage at or above which a plant is ready for harvest
pub const READY_THRESHOLD: f64 = 60.0;

/// Ripe percentage at or above which a plant is partially ripe
pub const PARTIAL_THRESHOLD: f64 = 30.0;

/// Discrete ripeness bucket derived from a ripe percentage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RipenessStatus {
    Ready,
    Partial,
    Unripe,
    NoData,
}

impl RipenessStatus {
    /// CSS class used by the map cells and badges
    pub fn css_class(&self) -> &'static str {
        match self {
            RipenessStatus::Ready => "ready",
            RipenessStatus::Partial => "partial",
            RipenessStatus::Unripe => "unripe",
            RipenessStatus::NoData => "nodata",
        }
    }

    /// Spanish label shown to operators
    pub fn label_es(&self) -> &'static str {
        match self {
            RipenessStatus::Ready => "Lista para cosecha",
            RipenessStatus::Partial => "Parcial",
            RipenessStatus::Unripe => "Inmadura",
            RipenessStatus::NoData => "Sin datos",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, RipenessStatus::Ready)
    }
}

impl std::fmt::Display for RipenessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RipenessStatus::Ready => write!(f, "ready"),
            RipenessStatus::Partial => write!(f, "partial"),
            RipenessStatus::Unripe => write!(f, "unripe"),
            RipenessStatus::NoData => write!(f, "no-data"),
        }
    }
}

/// Classify a ripe percentage. Lower bounds are inclusive.
pub fn classify_ripeness(ripe_percentage: Option<f64>) -> RipenessStatus {
    match ripe_percentage {
        None => RipenessStatus::NoData,
        Some(pct) if pct >= READY_THRESHOLD => RipenessStatus::Ready,
        Some(pct) if pct >= PARTIAL_THRESHOLD => RipenessStatus::Partial,
        Some(_) => RipenessStatus::Unripe,
    }
}

/// Whether a detection counts toward "ready for harvest" (absent counts as 0)
pub fn is_ready_for_harvest(ripe_percentage: Option<f64>) -> bool {
    ripe_percentage.unwrap_or(0.0) >= READY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(classify_ripeness(Some(60.0)), RipenessStatus::Ready);
        assert_eq!(classify_ripeness(Some(59.999)), RipenessStatus::Partial);
        assert_eq!(classify_ripeness(Some(30.0)), RipenessStatus::Partial);
        assert_eq!(classify_ripeness(Some(29.999)), RipenessStatus::Unripe);
        assert_eq!(classify_ripeness(Some(0.0)), RipenessStatus::Unripe);
        assert_eq!(classify_ripeness(Some(100.0)), RipenessStatus::Ready);
        assert_eq!(classify_ripeness(None), RipenessStatus::NoData);
    }

    #[test]
    fn test_ready_for_harvest_agrees_with_classifier() {
        for pct in [0.0, 29.9, 30.0, 59.99, 60.0, 75.5, 100.0] {
            assert_eq!(
                is_ready_for_harvest(Some(pct)),
                classify_ripeness(Some(pct)).is_ready()
            );
        }
        assert!(!is_ready_for_harvest(None));
    }

    #[test]
    fn test_labels() {
        assert_eq!(RipenessStatus::NoData.css_class(), "nodata");
        assert_eq!(RipenessStatus::NoData.label_es(), "Sin datos");
        assert_eq!(RipenessStatus::NoData.to_string(), "no-data");
        assert_eq!(
            serde_json::to_string(&RipenessStatus::NoData).unwrap(),
            "\"no_data\""
        );
    }
}
