//! Validation utilities for MADUREX form and filter input

use chrono::NaiveDate;
use validator::{Validate, ValidationErrors};

use crate::models::{PlantInput, PLANT_CODE_DIGITS, PLANT_CODE_PREFIX};

/// A single failed field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Validate plant form input, returning every failing field
pub fn validate_plant_input(input: &PlantInput) -> Result<(), Vec<FieldError>> {
    input.validate().map_err(|errors| collect_field_errors(&errors))
}

fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut collected: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| FieldError {
                field: field.to_string(),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field)),
            })
        })
        .collect();
    collected.sort_by(|a, b| a.field.cmp(&b.field));
    collected
}

/// Validate plant code format: `PLT-` followed by six digits
pub fn validate_plant_code(code: &str) -> Result<(), &'static str> {
    let digits = code
        .strip_prefix(PLANT_CODE_PREFIX)
        .ok_or("Plant code must start with 'PLT-'")?;

    if digits.len() != PLANT_CODE_DIGITS {
        return Err("Plant code must have six digits");
    }
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Plant code must be numeric after the prefix");
    }
    Ok(())
}

/// Parse a field selector value. Empty means "all fields".
pub fn parse_field_filter(value: &str) -> Result<Option<i32>, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i32>()
        .map(Some)
        .map_err(|_| "Field filter must be a whole number")
}

/// Parse a `YYYY-MM-DD` date input. Empty means "no bound".
pub fn parse_date_filter(value: &str) -> Result<Option<NaiveDate>, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| "Date must be in YYYY-MM-DD format")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(field: i32, row: i32, position: i32) -> PlantInput {
        PlantInput {
            field_number: field,
            row_number: row,
            position_number: position,
            variety: None,
            description: None,
        }
    }

    #[test]
    fn test_validate_plant_input_valid() {
        assert!(validate_plant_input(&input(1, 1, 1)).is_ok());
        assert!(validate_plant_input(&input(3, 40, 12)).is_ok());
    }

    #[test]
    fn test_validate_plant_input_reports_each_field() {
        let errors = validate_plant_input(&input(0, 1, -2)).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["field_number", "position_number"]);
        assert_eq!(errors[0].message, "Field number must be at least 1");
    }

    #[test]
    fn test_validate_plant_input_long_variety() {
        let mut long = input(1, 1, 1);
        long.variety = Some("x".repeat(101));
        let errors = validate_plant_input(&long).unwrap_err();
        assert_eq!(errors[0].field, "variety");
    }

    #[test]
    fn test_validate_plant_code() {
        assert!(validate_plant_code("PLT-000001").is_ok());
        assert!(validate_plant_code("PLT-123456").is_ok());
        assert!(validate_plant_code("PLT-00001").is_err());
        assert!(validate_plant_code("PLT-00000A").is_err());
        assert!(validate_plant_code("QR-000001").is_err());
    }

    #[test]
    fn test_parse_field_filter() {
        assert_eq!(parse_field_filter(""), Ok(None));
        assert_eq!(parse_field_filter(" 2 "), Ok(Some(2)));
        assert!(parse_field_filter("dos").is_err());
    }

    #[test]
    fn test_parse_date_filter() {
        assert_eq!(parse_date_filter(""), Ok(None));
        assert_eq!(
            parse_date_filter("2025-03-15"),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 15))
        );
        assert!(parse_date_filter("15/03/2025").is_err());
    }
}
