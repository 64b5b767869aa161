//! Passport validity rule for visa application submissions.

use chrono::{DateTime, Months, NaiveDate, Utc};

use crate::error::AppError;

/// Minimum remaining passport validity, measured from the submission date.
pub const PASSPORT_MIN_VALIDITY_MONTHS: u32 = 6;

/// A passport must be valid for at least six months from the submission
/// date. The exact boundary (expiry == submission date + 6 months) passes.
pub fn validate_passport_expiry(expiry: NaiveDate, now: DateTime<Utc>) -> Result<(), AppError> {
    let threshold = now
        .date_naive()
        .checked_add_months(Months::new(PASSPORT_MIN_VALIDITY_MONTHS))
        .ok_or_else(|| AppError::Validation("Passport expiry date out of range".to_string()))?;
    if expiry < threshold {
        return Err(AppError::passport_expiry_too_soon());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn expiry_well_past_threshold_passes() {
        let now = at(2025, 1, 15);
        let expiry = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert!(validate_passport_expiry(expiry, now).is_ok());
    }

    #[test]
    fn exact_boundary_passes() {
        let now = at(2025, 1, 15);
        let expiry = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        assert!(validate_passport_expiry(expiry, now).is_ok());
    }

    #[test]
    fn one_day_short_fails() {
        let now = at(2025, 1, 15);
        let expiry = NaiveDate::from_ymd_opt(2025, 7, 14).unwrap();
        let err = validate_passport_expiry(expiry, now).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("6 months"));
    }

    #[test]
    fn month_end_clamping() {
        // Aug 31 + 6 months clamps to Feb 28 (non-leap year)
        let now = at(2025, 8, 31);
        let clamped = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert!(validate_passport_expiry(clamped, now).is_ok());
        assert!(validate_passport_expiry(
            clamped - chrono::Duration::days(1),
            now
        )
        .is_err());
    }
}
