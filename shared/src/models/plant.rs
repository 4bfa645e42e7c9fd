//! Plant models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Prefix of every plant code
pub const PLANT_CODE_PREFIX: &str = "PLT-";

/// Number of digits in the numeric part of a plant code
pub const PLANT_CODE_DIGITS: usize = 6;

/// Largest row a plant may be registered in; bounds the map grid height
pub const MAX_ROW_NUMBER: i32 = 500;

/// Largest position within a row; bounds the map grid width
pub const MAX_POSITION_NUMBER: i32 = 500;

/// One physical strawberry plant in the field grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plant {
    pub id: i64,
    /// Unique sequential code, e.g. `PLT-000001`
    pub code: String,
    pub field_number: i32,
    pub row_number: i32,
    pub position_number: i32,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Plant {
    /// Grid address of the plant within its field
    pub fn placement(&self) -> (i32, i32) {
        (self.row_number, self.position_number)
    }

    /// Apply form input to an existing plant (code and id are kept)
    pub fn apply(&mut self, input: PlantInput) {
        let input = input.normalized();
        self.field_number = input.field_number;
        self.row_number = input.row_number;
        self.position_number = input.position_number;
        self.variety = input.variety;
        self.description = input.description;
    }
}

/// Plant registry form input, used for both create and update
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct PlantInput {
    #[validate(range(min = 1, message = "Field number must be at least 1"))]
    pub field_number: i32,
    #[validate(range(min = 1, max = 500, message = "Row number must be between 1 and 500"))]
    pub row_number: i32,
    #[validate(range(min = 1, max = 500, message = "Position number must be between 1 and 500"))]
    pub position_number: i32,
    #[validate(length(max = 100, message = "Variety must be at most 100 characters"))]
    #[serde(default)]
    pub variety: Option<String>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    #[serde(default)]
    pub description: Option<String>,
}

impl PlantInput {
    /// Trim optional text fields; blank values become absent
    pub fn normalized(self) -> Self {
        Self {
            variety: normalize_text(self.variety),
            description: normalize_text(self.description),
            ..self
        }
    }
}

/// A plant row about to be inserted into the store
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewPlant {
    pub code: String,
    pub field_number: i32,
    pub row_number: i32,
    pub position_number: i32,
    pub variety: Option<String>,
    pub description: Option<String>,
}

impl NewPlant {
    pub fn new(code: String, input: PlantInput) -> Self {
        let input = input.normalized();
        Self {
            code,
            field_number: input.field_number,
            row_number: input.row_number,
            position_number: input.position_number,
            variety: input.variety,
            description: input.description,
        }
    }

    pub fn into_plant(self, id: i64) -> Plant {
        Plant {
            id,
            code: self.code,
            field_number: self.field_number,
            row_number: self.row_number,
            position_number: self.position_number,
            variety: self.variety,
            description: self.description,
        }
    }
}

/// Format the plant code for a sequence number: `7` -> `PLT-000007`
pub fn format_plant_code(sequence: u64) -> String {
    format!("{}{:0width$}", PLANT_CODE_PREFIX, sequence, width = PLANT_CODE_DIGITS)
}

/// Code candidate for a new plant given the current total and the attempt number
pub fn next_plant_code(current_count: u64, attempt: u32) -> String {
    format_plant_code(current_count + 1 + u64::from(attempt))
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
