//! Tests for plant code generation, form validation and QR naming

use proptest::prelude::*;
use shared::{
    format_plant_code, next_plant_code, qr_download_filename, qr_image_url,
    validate_plant_code, validate_plant_input, PlantInput, DEFAULT_QR_ENDPOINT,
    MAX_POSITION_NUMBER, MAX_ROW_NUMBER,
};

fn input(field: i32, row: i32, position: i32) -> PlantInput {
    PlantInput {
        field_number: field,
        row_number: row,
        position_number: position,
        variety: None,
        description: None,
    }
}

mod codes {
    use super::*;

    #[test]
    fn first_plant_code() {
        assert_eq!(next_plant_code(0, 0), "PLT-000001");
    }

    #[test]
    fn retry_moves_to_next_sequence() {
        assert_eq!(next_plant_code(41, 0), "PLT-000042");
        assert_eq!(next_plant_code(41, 2), "PLT-000044");
    }

    #[test]
    fn wide_sequence_is_not_truncated() {
        assert_eq!(format_plant_code(1_234_567), "PLT-1234567");
    }

    #[test]
    fn qr_names_follow_code() {
        assert_eq!(qr_download_filename("PLT-000007"), "QR_PLT-000007.png");
        assert!(qr_image_url(DEFAULT_QR_ENDPOINT, "PLT-000007", 512).contains("data=PLT-000007"));
    }
}

mod form {
    use super::*;

    #[test]
    fn valid_input_passes() {
        assert!(validate_plant_input(&input(1, 1, 1)).is_ok());
    }

    #[test]
    fn every_failing_field_is_reported() {
        let errors = validate_plant_input(&input(0, 0, 1)).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["field_number", "row_number"]);
    }

    #[test]
    fn placement_beyond_grid_limits_rejected() {
        assert!(validate_plant_input(&input(1, MAX_ROW_NUMBER, MAX_POSITION_NUMBER)).is_ok());

        let errors = validate_plant_input(&input(1, 2_000_000, 2_000_000)).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["position_number", "row_number"]);
    }

    #[test]
    fn long_variety_rejected() {
        let mut long = input(1, 1, 1);
        long.variety = Some("x".repeat(101));
        let errors = validate_plant_input(&long).unwrap_err();
        assert_eq!(errors[0].field, "variety");
    }

    #[test]
    fn blank_text_normalized_away() {
        let mut raw = input(1, 1, 1);
        raw.variety = Some("  ".to_string());
        raw.description = Some(" borde norte ".to_string());
        let normalized = raw.normalized();
        assert_eq!(normalized.variety, None);
        assert_eq!(normalized.description.as_deref(), Some("borde norte"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Generated codes below a million are well-formed
        #[test]
        fn prop_generated_codes_valid(count in 0u64..999_990u64, attempt in 0u32..5u32) {
            let code = next_plant_code(count, attempt);
            prop_assert!(validate_plant_code(&code).is_ok());
        }

        /// Successive attempts produce distinct codes
        #[test]
        fn prop_attempts_distinct(count in 0u64..100_000u64, a in 0u32..5u32, b in 0u32..5u32) {
            prop_assume!(a != b);
            prop_assert_ne!(next_plant_code(count, a), next_plant_code(count, b));
        }

        /// Positive coordinates always validate
        #[test]
        fn prop_positive_coordinates_valid(f in 1i32..100, r in 1i32..100, p in 1i32..100) {
            prop_assert!(validate_plant_input(&input(f, r, p)).is_ok());
        }

        /// A non-positive coordinate is always reported
        #[test]
        fn prop_non_positive_rejected(bad in -50i32..=0) {
            prop_assert!(validate_plant_input(&input(1, 1, bad)).is_err());
        }
    }
}
