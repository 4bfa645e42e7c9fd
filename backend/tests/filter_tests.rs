//! Tests for the plant registry and detection log filters

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use shared::{
    build_detection_log, build_plant_registry, parse_date_filter, parse_field_filter, Detection,
    DetectionFilter, Plant, PlantFilter, PlantRef,
};

fn plant(id: i64, field: i32, variety: Option<&str>) -> Plant {
    Plant {
        id,
        code: format!("PLT-{:06}", id),
        field_number: field,
        row_number: 1,
        position_number: 1,
        variety: variety.map(str::to_string),
        description: None,
    }
}

fn detection(id: i64, code: &str, field: i32, at: chrono::DateTime<Utc>) -> Detection {
    Detection {
        id,
        plant_id: id,
        timestamp: at.into(),
        ripe_count: 2,
        semi_ripe_count: 1,
        unripe_count: 1,
        total_count: None,
        ripe_percentage: Some(50.0),
        harvest_recommendation: None,
        image_url: None,
        plant: Some(PlantRef {
            code: code.to_string(),
            field_number: field,
            row_number: Some(1),
            position_number: Some(1),
        }),
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

// =============================================================================
// Plant registry
// =============================================================================

mod registry {
    use super::*;

    fn plants() -> Vec<Plant> {
        vec![
            plant(1, 1, Some("Albion")),
            plant(2, 2, Some("Monterey")),
            plant(3, 2, None),
        ]
    }

    #[test]
    fn search_matches_code_case_insensitively() {
        let filter = PlantFilter {
            field: None,
            search: Some("plt-000002".to_string()),
        };
        let view = build_plant_registry(&plants(), filter);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].code, "PLT-000002");
    }

    #[test]
    fn search_matches_variety() {
        let filter = PlantFilter {
            field: None,
            search: Some("mont".to_string()),
        };
        assert_eq!(build_plant_registry(&plants(), filter).rows[0].id, 2);
    }

    #[test]
    fn field_and_search_combine() {
        let filter = PlantFilter {
            field: Some(1),
            search: Some("monterey".to_string()),
        };
        let view = build_plant_registry(&plants(), filter);
        assert!(view.no_matches);
        assert_eq!(view.count_label, "0 plantas");
    }

    #[test]
    fn missing_variety_shows_placeholder() {
        let filter = PlantFilter {
            field: Some(2),
            search: None,
        };
        let view = build_plant_registry(&plants(), filter);
        assert_eq!(view.rows[1].variety, "-");
        assert_eq!(view.field_options, vec![1, 2]);
    }
}

// =============================================================================
// Detection log
// =============================================================================

mod detection_log {
    use super::*;

    fn detections() -> Vec<Detection> {
        vec![
            // 23:30 on the 14th in Lima
            detection(1, "PLT-000001", 1, Utc.with_ymd_and_hms(2025, 3, 15, 4, 30, 0).unwrap()),
            detection(2, "PLT-000002", 2, Utc.with_ymd_and_hms(2025, 3, 15, 15, 0, 0).unwrap()),
            // 23:59:30 on the 15th in Lima
            detection(3, "PLT-000012", 1, Utc.with_ymd_and_hms(2025, 3, 16, 4, 59, 30).unwrap()),
        ]
    }

    #[test]
    fn date_range_uses_local_days() {
        let filter = DetectionFilter {
            from: Some(day(15)),
            to: Some(day(15)),
            ..DetectionFilter::default()
        };
        let ids: Vec<i64> = build_detection_log(&detections(), filter, vec![])
            .rows
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn plant_code_substring() {
        let filter = DetectionFilter {
            plant: Some("0001".to_string()),
            ..DetectionFilter::default()
        };
        let view = build_detection_log(&detections(), filter, vec![]);
        assert_eq!(view.count_label, "2 detecciones");
    }

    #[test]
    fn field_filter_uses_embedded_plant() {
        let mut orphan = detection(4, "PLT-000004", 1, Utc::now());
        orphan.plant = None;
        let mut all = detections();
        all.push(orphan);
        let filter = DetectionFilter {
            field: Some(1),
            ..DetectionFilter::default()
        };
        let view = build_detection_log(&all, filter, vec![1, 2]);
        assert_eq!(view.rows.len(), 2);
    }

    #[test]
    fn orphan_row_falls_back_to_plant_id() {
        let mut orphan = detection(4, "PLT-000004", 1, Utc::now());
        orphan.plant = None;
        let view = build_detection_log(&[orphan], DetectionFilter::default(), vec![]);
        assert_eq!(view.rows[0].plant_label, "ID 4");
        assert_eq!(view.rows[0].field_label, "Campo -");
        assert_eq!(view.rows[0].total, 4);
    }

    #[test]
    fn no_filter_keeps_everything() {
        assert!(DetectionFilter::default().is_empty());
        let view = build_detection_log(&detections(), DetectionFilter::default(), vec![]);
        assert_eq!(view.rows.len(), 3);
        assert!(!view.no_matches);
    }
}

// =============================================================================
// Query parameter parsing
// =============================================================================

mod params {
    use super::*;

    #[test]
    fn field_filter_values() {
        assert_eq!(parse_field_filter(""), Ok(None));
        assert_eq!(parse_field_filter(" 3 "), Ok(Some(3)));
        assert!(parse_field_filter("tres").is_err());
    }

    #[test]
    fn date_filter_values() {
        assert_eq!(parse_date_filter("2025-03-15"), Ok(Some(day(15))));
        assert_eq!(parse_date_filter(""), Ok(None));
        assert!(parse_date_filter("15/03/2025").is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn plants_strategy() -> impl Strategy<Value = Vec<Plant>> {
        prop::collection::vec((1i32..5i32, prop::option::of("[A-Za-z]{3,8}")), 0..30).prop_map(
            |specs| {
                specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (field, variety))| Plant {
                        variety,
                        ..plant(i as i64 + 1, field, None)
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Filtering never adds rows and keeps the input order
        #[test]
        fn prop_registry_is_ordered_subset(plants in plants_strategy(), field in prop::option::of(1i32..5i32), search in prop::option::of("[a-z0-9]{0,3}")) {
            let view = build_plant_registry(&plants, PlantFilter { field, search });
            prop_assert!(view.rows.len() <= plants.len());
            let ids: Vec<i64> = view.rows.iter().map(|r| r.id).collect();
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            prop_assert_eq!(ids, sorted);
            prop_assert_eq!(view.no_matches, view.rows.is_empty());
        }

        /// Every row satisfies the active field filter
        #[test]
        fn prop_registry_respects_field(plants in plants_strategy(), field in 1i32..5i32) {
            let view = build_plant_registry(&plants, PlantFilter { field: Some(field), search: None });
            let expected = plants.iter().filter(|p| p.field_number == field).count();
            prop_assert_eq!(view.rows.len(), expected);
        }
    }
}
