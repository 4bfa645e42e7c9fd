//! Greenhouse map construction
//!
//! Each field becomes a grid of `max row x max position` cells. A cell either
//! holds a registered plant, colored by the status of its latest detection, or
//! is empty and rendered de-emphasized. Grids never grow past
//! [`MAX_ROW_NUMBER`] x [`MAX_POSITION_NUMBER`]; plants registered beyond that
//! still count toward the field but are not placed.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::aggregation::latest_detection_per_plant;
use crate::format::format_percent;
use crate::models::{Detection, Plant, MAX_POSITION_NUMBER, MAX_ROW_NUMBER};
use crate::ripeness::{classify_ripeness, RipenessStatus};

/// A plant placed on the map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantCell {
    pub plant_id: i64,
    pub code: String,
    pub row_number: i32,
    pub position_number: i32,
    pub status: RipenessStatus,
    /// Ripe percentage of the latest detection, absent when there is none
    pub ripe_percentage: Option<f64>,
    /// e.g. `60.0%` or `Sin datos`
    pub percentage_label: String,
    /// e.g. `PLT-000001 - F1 P2 - 60.0%`
    pub tooltip: String,
}

/// One grid position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapCell {
    Empty { row_number: i32, position_number: i32 },
    Plant(PlantCell),
}

impl MapCell {
    pub fn status(&self) -> RipenessStatus {
        match self {
            MapCell::Empty { .. } => RipenessStatus::NoData,
            MapCell::Plant(cell) => cell.status,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MapCell::Empty { .. })
    }
}

/// The grid of one field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldGrid {
    pub field_number: i32,
    pub plant_count: usize,
    pub max_row: i32,
    pub max_position: i32,
    /// Row-major, `max_row` rows of `max_position` cells
    pub rows: Vec<Vec<MapCell>>,
}

impl FieldGrid {
    /// Cell at a 1-based row and position
    pub fn cell(&self, row_number: i32, position_number: i32) -> Option<&MapCell> {
        if row_number < 1 || position_number < 1 {
            return None;
        }
        self.rows
            .get((row_number - 1) as usize)
            .and_then(|row| row.get((position_number - 1) as usize))
    }
}

/// Render model of the greenhouse map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GreenhouseView {
    pub field_filter: Option<i32>,
    pub fields: Vec<FieldGrid>,
    pub field_options: Vec<i32>,
}

impl GreenhouseView {
    /// No plants were registered for the selection
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Build the map from the plant list and every detection.
///
/// Plants outside `field_filter` are dropped. Plants with a row or position
/// below 1 or above the grid limits are not placed; if two plants share a grid
/// position the first one in list order wins.
pub fn build_greenhouse(
    plants: &[Plant],
    detections: &[Detection],
    field_filter: Option<i32>,
    field_options: Vec<i32>,
) -> GreenhouseView {
    let latest = latest_detection_per_plant(detections);

    let mut by_field: BTreeMap<i32, Vec<&Plant>> = BTreeMap::new();
    for plant in plants {
        if field_filter.map_or(true, |field| plant.field_number == field) {
            by_field.entry(plant.field_number).or_default().push(plant);
        }
    }

    let fields = by_field
        .into_iter()
        .map(|(field_number, field_plants)| build_field_grid(field_number, &field_plants, &latest))
        .collect();

    GreenhouseView {
        field_filter,
        fields,
        field_options,
    }
}

fn build_field_grid(
    field_number: i32,
    plants: &[&Plant],
    latest: &HashMap<i64, &Detection>,
) -> FieldGrid {
    let max_row = plants
        .iter()
        .map(|p| p.row_number)
        .max()
        .unwrap_or(0)
        .clamp(0, MAX_ROW_NUMBER);
    let max_position = plants
        .iter()
        .map(|p| p.position_number)
        .max()
        .unwrap_or(0)
        .clamp(0, MAX_POSITION_NUMBER);

    let mut placed: HashMap<(i32, i32), &Plant> = HashMap::new();
    for plant in plants {
        let (row, position) = plant.placement();
        if (1..=max_row).contains(&row) && (1..=max_position).contains(&position) {
            placed.entry((row, position)).or_insert(*plant);
        }
    }

    let rows = (1..=max_row)
        .map(|row_number| {
            (1..=max_position)
                .map(|position_number| match placed.get(&(row_number, position_number)) {
                    Some(plant) => MapCell::Plant(plant_cell(plant, latest.get(&plant.id).copied())),
                    None => MapCell::Empty {
                        row_number,
                        position_number,
                    },
                })
                .collect()
        })
        .collect();

    FieldGrid {
        field_number,
        plant_count: plants.len(),
        max_row,
        max_position,
        rows,
    }
}

fn plant_cell(plant: &Plant, latest: Option<&Detection>) -> PlantCell {
    let ripe_percentage = latest.and_then(|d| d.ripe_percentage);
    let status = classify_ripeness(ripe_percentage);
    let percentage_label = match ripe_percentage {
        Some(_) => format_percent(ripe_percentage),
        None => RipenessStatus::NoData.label_es().to_string(),
    };

    PlantCell {
        plant_id: plant.id,
        code: plant.code.clone(),
        row_number: plant.row_number,
        position_number: plant.position_number,
        status,
        ripe_percentage,
        tooltip: format!(
            "{} - F{} P{} - {}",
            plant.code, plant.row_number, plant.position_number, percentage_label
        ),
        percentage_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObservedAt;

    fn plant(id: i64, field: i32, row: i32, pos: i32) -> Plant {
        Plant {
            id,
            code: format!("PLT-{:06}", id),
            field_number: field,
            row_number: row,
            position_number: pos,
            variety: None,
            description: None,
        }
    }

    fn detection(id: i64, plant_id: i64, ts: &str, pct: Option<f64>) -> Detection {
        Detection {
            id,
            plant_id,
            timestamp: ObservedAt::parse(ts),
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
    fn test_grid_dimensions_and_gaps() {
        let plants = vec![plant(1, 1, 1, 1), plant(2, 1, 3, 2)];
        let view = build_greenhouse(&plants, &[], None, vec![1]);

        let grid = &view.fields[0];
        assert_eq!((grid.max_row, grid.max_position), (3, 2));
        assert_eq!(grid.rows.len(), 3);
        assert!(grid.rows.iter().all(|r| r.len() == 2));
        assert!(grid.cell(2, 1).unwrap().is_empty());
        assert_eq!(grid.cell(1, 1).unwrap().status(), RipenessStatus::NoData);
        assert!(grid.cell(4, 1).is_none());
        assert!(grid.cell(0, 1).is_none());
    }

    #[test]
    fn test_cell_uses_latest_detection() {
        let plants = vec![plant(1, 1, 1, 1)];
        let detections = vec![
            detection(1, 1, "2025-03-10T12:00:00Z", Some(80.0)),
            detection(2, 1, "2025-03-12T12:00:00Z", Some(20.0)),
        ];
        let view = build_greenhouse(&plants, &detections, None, vec![1]);

        match view.fields[0].cell(1, 1).unwrap() {
            MapCell::Plant(cell) => {
                assert_eq!(cell.status, RipenessStatus::Unripe);
                assert_eq!(cell.percentage_label, "20.0%");
                assert_eq!(cell.tooltip, "PLT-000001 - F1 P1 - 20.0%");
            }
            MapCell::Empty { .. } => panic!("expected plant cell"),
        }
    }

    #[test]
    fn test_absent_percentage_is_no_data() {
        let plants = vec![plant(1, 1, 1, 1)];
        let detections = vec![detection(1, 1, "2025-03-10T12:00:00Z", None)];
        let view = build_greenhouse(&plants, &detections, None, vec![1]);

        match view.fields[0].cell(1, 1).unwrap() {
            MapCell::Plant(cell) => {
                assert_eq!(cell.status, RipenessStatus::NoData);
                assert_eq!(cell.percentage_label, "Sin datos");
            }
            MapCell::Empty { .. } => panic!("expected plant cell"),
        }
    }

    #[test]
    fn test_field_filter_and_ordering() {
        let plants = vec![plant(1, 3, 1, 1), plant(2, 1, 1, 1), plant(3, 2, 1, 1)];
        let all = build_greenhouse(&plants, &[], None, vec![1, 2, 3]);
        let order: Vec<i32> = all.fields.iter().map(|f| f.field_number).collect();
        assert_eq!(order, vec![1, 2, 3]);

        let one = build_greenhouse(&plants, &[], Some(2), vec![1, 2, 3]);
        assert_eq!(one.fields.len(), 1);
        assert_eq!(one.fields[0].field_number, 2);

        let none = build_greenhouse(&plants, &[], Some(9), vec![1, 2, 3]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_duplicate_position_keeps_first() {
        let plants = vec![plant(1, 1, 1, 1), plant(2, 1, 1, 1)];
        let view = build_greenhouse(&plants, &[], None, vec![1]);
        let grid = &view.fields[0];
        assert_eq!(grid.plant_count, 2);
        match grid.cell(1, 1).unwrap() {
            MapCell::Plant(cell) => assert_eq!(cell.plant_id, 1),
            MapCell::Empty { .. } => panic!("expected plant cell"),
        }
    }

    #[test]
    fn test_oversized_placement_is_clamped() {
        let plants = vec![plant(1, 1, 2, 2), plant(2, 1, 2_000_000, 2_000_000)];
        let view = build_greenhouse(&plants, &[], None, vec![1]);
        let grid = &view.fields[0];

        assert_eq!((grid.max_row, grid.max_position), (MAX_ROW_NUMBER, MAX_POSITION_NUMBER));
        assert_eq!(grid.rows.len(), MAX_ROW_NUMBER as usize);
        assert_eq!(grid.plant_count, 2);
        let placed: Vec<i64> = grid
            .rows
            .iter()
            .flatten()
            .filter_map(|c| match c {
                MapCell::Plant(cell) => Some(cell.plant_id),
                MapCell::Empty { .. } => None,
            })
            .collect();
        assert_eq!(placed, vec![1]);
    }
}
