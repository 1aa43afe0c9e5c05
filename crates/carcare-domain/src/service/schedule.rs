//! Maintenance schedule: when the next service is due

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar months between services
pub const SERVICE_INTERVAL_MONTHS: u32 = 6;

/// Distance between services (odometer units)
pub const SERVICE_INTERVAL_MILEAGE: u64 = 5000;

/// Next service due date and odometer reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextService {
    pub date: NaiveDate,
    pub mileage: u64,
}

/// Compute the next service from the current one.
///
/// The date moves forward by six calendar months keeping the day of month; days that do
/// not exist in the target month clamp to its last day (2024-08-31 -> 2025-02-28).
pub fn compute_next(service_date: NaiveDate, mileage: u64) -> NextService {
    let date = service_date
        .checked_add_months(Months::new(SERVICE_INTERVAL_MONTHS))
        .unwrap_or(NaiveDate::MAX);

    NextService {
        date,
        mileage: mileage.saturating_add(SERVICE_INTERVAL_MILEAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_compute_next_basic() {
        let next = compute_next(date(2024, 1, 15), 10000);
        assert_eq!(next.date, date(2024, 7, 15));
        assert_eq!(next.mileage, 15000);
    }

    #[test]
    fn test_compute_next_crosses_year() {
        let next = compute_next(date(2024, 9, 30), 0);
        assert_eq!(next.date, date(2025, 3, 30));
        assert_eq!(next.mileage, 5000);
    }

    #[test]
    fn test_compute_next_clamps_short_month() {
        assert_eq!(compute_next(date(2024, 8, 31), 0).date, date(2025, 2, 28));
        assert_eq!(compute_next(date(2023, 8, 31), 0).date, date(2024, 2, 29));
        assert_eq!(compute_next(date(2024, 12, 31), 0).date, date(2025, 6, 30));
    }

    #[test]
    fn test_compute_next_is_idempotent() {
        let first = compute_next(date(2024, 5, 20), 42_000);
        let second = compute_next(date(2024, 5, 20), 42_000);
        assert_eq!(first, second);
    }

    #[test]
    fn test_compute_next_saturates() {
        let next = compute_next(NaiveDate::MAX, u64::MAX);
        assert_eq!(next.date, NaiveDate::MAX);
        assert_eq!(next.mileage, u64::MAX);
    }
}
