//! Field-level validation helpers shared by the write inputs.
//!
//! String lengths and formats are declared with `validator` derives on
//! the input types; decimal bounds are checked here because `validator`
//! has no notion of `Decimal`. Both end up in one `ValidationErrors`.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::{ValidationError, ValidationErrors};

use crate::config::{COORDINATE_SCALE, CURRENCY_SCALE, MAX_PRICE_DIGITS};
use crate::errors::{AppError, AppResult};

/// Accumulates field errors from derived and hand-written checks.
pub struct FieldChecks {
    errors: ValidationErrors,
}

impl FieldChecks {
    /// Start from the outcome of a `Validate::validate` call.
    pub fn start(derived: Result<(), ValidationErrors>) -> Self {
        Self {
            errors: derived.err().unwrap_or_else(ValidationErrors::new),
        }
    }

    pub fn fail(
        &mut self,
        field: &'static str,
        code: &'static str,
        message: impl Into<Cow<'static, str>>,
    ) {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        self.errors.add(field, error);
    }

    /// Required free text must contain something besides whitespace.
    pub fn not_blank(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.fail(field, "required", format!("{} may not be blank", field));
        }
    }

    /// Currency amount: non-negative, at most 12 integer digits and 2 decimals.
    pub fn money(&mut self, field: &'static str, value: &Decimal) {
        if value.is_sign_negative() && !value.is_zero() {
            self.fail(field, "range", format!("{} cannot be negative", field));
            return;
        }
        if value.trunc() >= Decimal::from(10_i64.pow(MAX_PRICE_DIGITS)) {
            self.fail(
                field,
                "range",
                format!("{} must have at most {} digits before the decimal point", field, MAX_PRICE_DIGITS),
            );
        }
        if value.normalize().scale() > CURRENCY_SCALE {
            self.fail(
                field,
                "scale",
                format!("{} must have at most {} decimal places", field, CURRENCY_SCALE),
            );
        }
    }

    /// Latitude (limit 90) or longitude (limit 180) with at most 6 decimals.
    pub fn coordinate(&mut self, field: &'static str, value: &Decimal, limit: i64) {
        if value.abs() > Decimal::from(limit) {
            self.fail(field, "range", format!("{} must be between -{} and {}", field, limit, limit));
        }
        if value.normalize().scale() > COORDINATE_SCALE {
            self.fail(
                field,
                "scale",
                format!("{} must have at most {} decimal places", field, COORDINATE_SCALE),
            );
        }
    }

    /// Convert into `Err(AppError::InvalidFields)` when anything failed.
    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(self.errors))
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Round a currency amount to the stored precision (banker's rounding),
/// always carrying exactly two decimal places.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(CURRENCY_SCALE);
    rounded.rescale(CURRENCY_SCALE);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_money_bounds() {
        let mut checks = FieldChecks::start(Ok(()));
        checks.money("price", &dec("2500000.00"));
        assert!(checks.finish().is_ok());

        let mut checks = FieldChecks::start(Ok(()));
        checks.money("price", &dec("-1"));
        checks.money("sales_volume", &dec("10.125"));
        let err = checks.finish().unwrap_err();
        let details = err.field_details().unwrap();
        assert!(details.contains_key("price"));
        assert!(details.contains_key("sales_volume"));
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_scale() {
        let mut checks = FieldChecks::start(Ok(()));
        checks.money("price", &dec("100.5000"));
        checks.coordinate("latitude", &dec("25.2048000"), 90);
        assert!(checks.finish().is_ok());
    }

    #[test]
    fn test_coordinate_out_of_range() {
        let mut checks = FieldChecks::start(Ok(()));
        checks.coordinate("longitude", &dec("-180.5"), 180);
        assert!(checks.finish().is_err());
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut checks = FieldChecks::start(Ok(()));
        checks.not_blank("name", "   ");
        assert!(checks.finish().is_err());
    }

    #[test]
    fn test_double_option_distinguishes_null() {
        #[derive(Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "double_option")]
            area: Option<Option<u32>>,
        }

        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"area": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"area": 7}"#).unwrap();

        assert_eq!(absent.area, None);
        assert_eq!(null.area, Some(None));
        assert_eq!(set.area, Some(Some(7)));
    }

    #[test]
    fn test_round_money_half_even() {
        assert_eq!(round_money(dec("200.005")), dec("200.00"));
        assert_eq!(round_money(dec("200.015")), dec("200.02"));
        assert_eq!(round_money(dec("200")).to_string(), "200.00");
    }
}
