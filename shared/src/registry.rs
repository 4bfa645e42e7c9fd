//! Plant registry view model and its client-side filter

use serde::{Deserialize, Serialize};

use crate::aggregation::field_options;
use crate::models::Plant;

/// Filter controls of the plant registry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlantFilter {
    /// Exact field number
    #[serde(default)]
    pub field: Option<i32>,
    /// Case-insensitive substring of the code or variety
    #[serde(default)]
    pub search: Option<String>,
}

impl PlantFilter {
    pub fn matches(&self, plant: &Plant) -> bool {
        if let Some(field) = self.field {
            if plant.field_number != field {
                return false;
            }
        }

        match self.needle() {
            None => true,
            Some(needle) => {
                plant.code.to_lowercase().contains(&needle)
                    || plant
                        .variety
                        .as_deref()
                        .map(|v| v.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            }
        }
    }

    /// Apply the filter, keeping the input order
    pub fn apply<'a>(&self, plants: &'a [Plant]) -> Vec<&'a Plant> {
        plants.iter().filter(|p| self.matches(p)).collect()
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// One row of the registry table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantRow {
    pub id: i64,
    pub code: String,
    pub field_label: String,
    pub row_label: String,
    pub position_label: String,
    pub variety: String,
    pub description: String,
}

impl From<&Plant> for PlantRow {
    fn from(plant: &Plant) -> Self {
        Self {
            id: plant.id,
            code: plant.code.clone(),
            field_label: format!("Campo {}", plant.field_number),
            row_label: format!("Fila {}", plant.row_number),
            position_label: format!("Pos. {}", plant.position_number),
            variety: plant.variety.clone().unwrap_or_else(|| "-".to_string()),
            description: plant.description.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Render model of the plant registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantRegistryView {
    pub filter: PlantFilter,
    pub rows: Vec<PlantRow>,
    /// e.g. `12 plantas`
    pub count_label: String,
    /// True when the filter left nothing to show
    pub no_matches: bool,
    pub field_options: Vec<i32>,
}

/// Build the registry view from the full, already-fetched plant list
pub fn build_plant_registry(plants: &[Plant], filter: PlantFilter) -> PlantRegistryView {
    let rows: Vec<PlantRow> = filter.apply(plants).into_iter().map(PlantRow::from).collect();
    PlantRegistryView {
        count_label: format!("{} plantas", rows.len()),
        no_matches: rows.is_empty(),
        field_options: field_options(plants),
        filter,
        rows,
    }
}
