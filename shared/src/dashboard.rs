//! Dashboard view model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregation::{
    average_ripe_percentage, daily_volume, detections_since, field_summaries,
    ready_for_harvest_count, ripeness_composition, sort_newest_first, sort_oldest_first,
    DailyVolume, FieldSummary, RipenessComposition,
};
use crate::detection_log::DetectionRow;
use crate::format::{format_percent, local_date, start_of_local_day};
use crate::models::{Detection, Plant};

/// Rows shown in the "latest detections" table by default
pub const DEFAULT_RECENT_LIMIT: usize = 15;

/// Headline numbers of the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardKpis {
    pub total_plants: usize,
    pub detections_today: usize,
    pub average_ripe_percentage: f64,
    pub average_label: String,
    pub ready_for_harvest: usize,
}

/// Render model of the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardView {
    pub field_filter: Option<i32>,
    pub kpis: DashboardKpis,
    pub field_summaries: Vec<FieldSummary>,
    pub daily_volume: DailyVolume,
    pub composition: RipenessComposition,
    pub recent_detections: Vec<DetectionRow>,
    pub field_options: Vec<i32>,
}

/// Rows the dashboard is computed from, already restricted to `field_filter`
#[derive(Debug, Clone)]
pub struct DashboardInput<'a> {
    pub plants: &'a [Plant],
    pub detections: Vec<Detection>,
    pub field_filter: Option<i32>,
    pub field_options: Vec<i32>,
    pub now: DateTime<Utc>,
    pub recent_limit: usize,
}

pub fn build_dashboard(input: DashboardInput<'_>) -> DashboardView {
    let DashboardInput {
        plants,
        mut detections,
        field_filter,
        field_options,
        now,
        recent_limit,
    } = input;

    // Day buckets are discovered oldest first
    sort_oldest_first(&mut detections);
    let daily_volume = daily_volume(&detections);

    let average = average_ripe_percentage(&detections);
    let kpis = DashboardKpis {
        total_plants: plants.len(),
        detections_today: detections_since(&detections, start_of_local_day(local_date(&now))),
        average_ripe_percentage: average,
        average_label: format_percent(Some(average)),
        ready_for_harvest: ready_for_harvest_count(&detections),
    };

    let summaries = field_summaries(plants, &detections);
    let composition = ripeness_composition(&detections);

    sort_newest_first(&mut detections);
    let recent_detections = detections
        .iter()
        .take(recent_limit)
        .map(DetectionRow::from)
        .collect();

    DashboardView {
        field_filter,
        kpis,
        field_summaries: summaries,
        daily_volume,
        composition,
        recent_detections,
        field_options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::parse_timestamp;
    use crate::models::{ObservedAt, PlantRef};

    fn plant() -> Plant {
        Plant {
            id: 1,
            code: "PLT-000001".to_string(),
            field_number: 1,
            row_number: 1,
            position_number: 1,
            variety: None,
            description: None,
        }
    }

    fn detection(id: i64, ts: &str, pct: Option<f64>) -> Detection {
        Detection {
            id,
            plant_id: 1,
            timestamp: ObservedAt::parse(ts),
            ripe_count: 6,
            semi_ripe_count: 2,
            unripe_count: 2,
            total_count: Some(10),
            ripe_percentage: pct,
            harvest_recommendation: Some("Cosechar".to_string()),
            image_url: None,
            plant: Some(PlantRef {
                code: "PLT-000001".to_string(),
                field_number: 1,
                row_number: Some(1),
                position_number: Some(1),
            }),
        }
    }

    fn input(plants: &[Plant], detections: Vec<Detection>, limit: usize) -> DashboardInput<'_> {
        DashboardInput {
            plants,
            detections,
            field_filter: None,
            field_options: vec![1],
            now: parse_timestamp("2025-03-15T20:00:00Z").unwrap(),
            recent_limit: limit,
        }
    }

    #[test]
    fn test_single_ready_detection() {
        let plants = vec![plant()];
        let view = build_dashboard(input(&plants, vec![detection(1, "2025-03-15T14:00:00Z", Some(60.0))], 15));

        assert_eq!(view.kpis.total_plants, 1);
        assert_eq!(view.kpis.ready_for_harvest, 1);
        assert_eq!(view.kpis.average_label, "60.0%");
        assert_eq!(view.kpis.detections_today, 1);
        assert_eq!(view.field_summaries.len(), 1);
        assert_eq!(view.daily_volume.buckets.len(), 1);
        assert_eq!(view.daily_volume.buckets[0].proportion, 100.0);
    }

    #[test]
    fn test_empty_dashboard_defaults() {
        let view = build_dashboard(input(&[], Vec::new(), 15));
        assert_eq!(view.kpis.average_ripe_percentage, 0.0);
        assert_eq!(view.kpis.average_label, "0.0%");
        assert_eq!(view.composition, RipenessComposition::NoData);
        assert!(view.daily_volume.is_empty());
        assert!(view.recent_detections.is_empty());
        assert!(view.field_summaries.is_empty());
    }

    #[test]
    fn test_recent_detections_newest_first_and_limited() {
        let plants = vec![plant()];
        let detections = vec![
            detection(1, "2025-03-13T14:00:00Z", Some(10.0)),
            detection(2, "2025-03-15T14:00:00Z", None),
            detection(3, "2025-03-14T14:00:00Z", Some(70.0)),
        ];
        let view = build_dashboard(input(&plants, detections, 2));

        let ids: Vec<i64> = view.recent_detections.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(view.recent_detections[0].percentage_label, "-");
        // Yesterday evening in Lima is not "today"
        assert_eq!(view.kpis.detections_today, 1);
        let labels: Vec<&str> = view.daily_volume.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["13/3/2025", "14/3/2025", "15/3/2025"]);
    }

    #[test]
    fn test_unparsed_time_stays_out_of_date_aggregates() {
        let plants = vec![plant()];
        let detections = vec![
            detection(1, "2025-03-15T14:00:00Z", Some(80.0)),
            detection(2, "sin fecha", Some(40.0)),
        ];
        let view = build_dashboard(input(&plants, detections, 15));

        assert_eq!(view.kpis.detections_today, 1);
        assert_eq!(view.daily_volume.buckets.len(), 1);
        assert_eq!(view.daily_volume.buckets[0].count, 1);
        // Non-date aggregates still count the row
        assert_eq!(view.kpis.average_label, "60.0%");
        assert_eq!(view.recent_detections.len(), 2);
        assert_eq!(view.recent_detections[1].timestamp_label, "sin fecha");
    }
}
