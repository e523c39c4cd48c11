//! Validation utilities for form input
//!
//! Field-level checks used by the `validator` derives on the payload models
//! and by forms that are validated by hand before any network call.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Smallest and largest accepted low-stock alert threshold
pub const ALERT_THRESHOLD_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

/// `validator` custom check: prices may be zero but never negative
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("Price cannot be negative".into());
        return Err(error);
    }
    Ok(())
}

/// Validate a low-stock alert threshold
pub fn validate_alert_threshold(threshold: i64) -> Result<(), &'static str> {
    if !ALERT_THRESHOLD_RANGE.contains(&threshold) {
        return Err("Alert threshold must be between 1 and 100");
    }
    Ok(())
}

/// Flatten `validator` errors into one message, first field first
pub fn first_error_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Invalid input".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&Decimal::from_str("-0.00").unwrap()).is_ok());
        assert!(validate_non_negative(&Decimal::from_str("19.99").unwrap()).is_ok());
        let err = validate_non_negative(&Decimal::from_str("-0.01").unwrap()).unwrap_err();
        assert_eq!(err.code, "non_negative");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_alert_threshold_range(threshold in -50i64..200) {
            let accepted = validate_alert_threshold(threshold).is_ok();
            prop_assert_eq!(accepted, (1..=100).contains(&threshold));
        }
    }
}
