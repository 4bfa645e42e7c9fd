//! Tests for the greenhouse map grid

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use shared::{build_greenhouse, render::render_greenhouse, Detection, MapCell, Plant, RipenessStatus};

fn plant(id: i64, field: i32, row: i32, position: i32) -> Plant {
    Plant {
        id,
        code: format!("PLT-{:06}", id),
        field_number: field,
        row_number: row,
        position_number: position,
        variety: None,
        description: None,
    }
}

fn detection(id: i64, plant_id: i64, minutes: i64, pct: Option<f64>) -> Detection {
    Detection {
        id,
        plant_id,
        timestamp: (Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap() + Duration::minutes(minutes)).into(),
        ripe_count: 0,
        semi_ripe_count: 0,
        unripe_count: 0,
        total_count: None,
        ripe_percentage: pct,
        harvest_recommendation: None,
        image_url: None,
        plant: None,
    }
}

#[test]
fn grid_spans_max_row_and_position() {
    let plants = vec![plant(1, 1, 1, 1), plant(2, 1, 2, 3)];
    let view = build_greenhouse(&plants, &[], None, vec![1]);
    let grid = &view.fields[0];
    assert_eq!((grid.max_row, grid.max_position), (2, 3));
    assert_eq!(grid.rows.iter().flatten().count(), 6);
    assert!(grid.cell(1, 2).unwrap().is_empty());
    assert_eq!(grid.cell(2, 3).unwrap().status(), RipenessStatus::NoData);
}

#[test]
fn cell_uses_latest_detection() {
    let plants = vec![plant(1, 1, 1, 1)];
    let detections = vec![
        detection(1, 1, 0, Some(80.0)),
        detection(2, 1, 30, Some(10.0)),
    ];
    let view = build_greenhouse(&plants, &detections, None, vec![1]);
    match view.fields[0].cell(1, 1) {
        Some(MapCell::Plant(cell)) => {
            assert_eq!(cell.status, RipenessStatus::Unripe);
            assert_eq!(cell.tooltip, "PLT-000001 - F1 P1 - 10.0%");
        }
        other => panic!("expected a plant cell, got {:?}", other),
    }
}

#[test]
fn absent_percentage_is_no_data() {
    let plants = vec![plant(1, 1, 1, 1)];
    let detections = vec![detection(1, 1, 0, None)];
    let view = build_greenhouse(&plants, &detections, None, vec![1]);
    match view.fields[0].cell(1, 1) {
        Some(MapCell::Plant(cell)) => {
            assert_eq!(cell.status, RipenessStatus::NoData);
            assert_eq!(cell.percentage_label, "Sin datos");
        }
        other => panic!("expected a plant cell, got {:?}", other),
    }
}

#[test]
fn duplicate_position_keeps_first_plant() {
    let plants = vec![plant(1, 1, 1, 1), plant(2, 1, 1, 1)];
    let view = build_greenhouse(&plants, &[], None, vec![1]);
    let grid = &view.fields[0];
    assert_eq!(grid.plant_count, 2);
    match grid.cell(1, 1) {
        Some(MapCell::Plant(cell)) => assert_eq!(cell.plant_id, 1),
        other => panic!("expected a plant cell, got {:?}", other),
    }
}

#[test]
fn field_filter_and_ordering() {
    let plants = vec![plant(1, 3, 1, 1), plant(2, 1, 1, 1), plant(3, 2, 1, 1)];
    let all = build_greenhouse(&plants, &[], None, vec![1, 2, 3]);
    let fields: Vec<i32> = all.fields.iter().map(|f| f.field_number).collect();
    assert_eq!(fields, vec![1, 2, 3]);

    let one = build_greenhouse(&plants, &[], Some(2), vec![1, 2, 3]);
    assert_eq!(one.fields.len(), 1);
    assert_eq!(one.field_options, vec![1, 2, 3]);
}

#[test]
fn empty_map_renders_note() {
    let view = build_greenhouse(&[], &[], None, vec![]);
    assert!(view.is_empty());
    assert!(render_greenhouse(&view).contains("No hay plantas registradas"));
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn plants_strategy() -> impl Strategy<Value = Vec<Plant>> {
        prop::collection::vec((1i32..4i32, -1i32..6i32, -1i32..6i32), 0..25).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (field, row, position))| plant(i as i64 + 1, field, row, position))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every grid is rectangular and sized by the largest coordinates
        #[test]
        fn prop_grid_is_rectangular(plants in plants_strategy()) {
            let view = build_greenhouse(&plants, &[], None, vec![]);
            for grid in &view.fields {
                prop_assert_eq!(grid.rows.len(), grid.max_row.max(0) as usize);
                for row in &grid.rows {
                    prop_assert_eq!(row.len(), grid.max_position.max(0) as usize);
                }
            }
        }

        /// Placed plants never exceed the registered count of the field
        #[test]
        fn prop_placed_cells_bounded(plants in plants_strategy()) {
            let view = build_greenhouse(&plants, &[], None, vec![]);
            let total: usize = view.fields.iter().map(|g| g.plant_count).sum();
            prop_assert_eq!(total, plants.len());
            for grid in &view.fields {
                let placed = grid.rows.iter().flatten().filter(|c| !c.is_empty()).count();
                prop_assert!(placed <= grid.plant_count);
            }
        }
    }
}
