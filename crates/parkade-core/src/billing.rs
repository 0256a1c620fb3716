//! Parking cost computation.
//!
//! Cost is a pure function of the two reservation timestamps and the
//! lot's hourly rate, evaluated once when a reservation is released.
//! Every started hour is billed in full, and a stay is never billed
//! less than one hour.

use chrono::{DateTime, Duration, Utc};

use crate::error::{ParkadeError, ParkadeResult};

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_HOUR: i128 = 3_600 * NANOS_PER_SECOND;

/// Number of whole hours billed for a stay between `parked_at` and
/// `released_at`: `ceil(elapsed / 1h)`, at least 1.
pub fn billable_hours(parked_at: DateTime<Utc>, released_at: DateTime<Utc>) -> ParkadeResult<i64> {
    let elapsed = released_at.signed_duration_since(parked_at);
    if elapsed < Duration::zero() {
        return Err(ParkadeError::validation(format!(
            "release time {released_at} precedes parking time {parked_at}"
        )));
    }

    // num_nanoseconds overflows after ~292 years; fall back to seconds.
    let nanos = elapsed
        .num_nanoseconds()
        .map(i128::from)
        .unwrap_or_else(|| i128::from(elapsed.num_seconds()) * NANOS_PER_SECOND);
    let hours = (nanos + NANOS_PER_HOUR - 1) / NANOS_PER_HOUR;

    i64::try_from(hours.max(1))
        .map_err(|_| ParkadeError::Internal(format!("billable hours overflow: {hours}")))
}

/// Billed hours and the resulting cost of one stay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charge {
    pub hours: i64,
    pub cost: f64,
}

/// Final charge for a stay at `price_per_hour`.
pub fn parking_cost(
    parked_at: DateTime<Utc>,
    released_at: DateTime<Utc>,
    price_per_hour: f64,
) -> ParkadeResult<Charge> {
    let hours = billable_hours(parked_at, released_at)?;
    Ok(Charge {
        hours,
        cost: hours as f64 * price_per_hour,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
    }

    #[test]
    fn ninety_minutes_bills_two_hours() {
        let end = start() + Duration::minutes(90);
        assert_eq!(billable_hours(start(), end).unwrap(), 2);
        assert_eq!(parking_cost(start(), end, 10.0).unwrap().cost, 20.0);
    }

    #[test]
    fn exact_hour_boundary_is_not_rounded_up() {
        let end = start() + Duration::seconds(7200);
        assert_eq!(parking_cost(start(), end, 10.0).unwrap().cost, 20.0);
    }

    #[test]
    fn one_millisecond_past_boundary_starts_a_new_hour() {
        let end = start() + Duration::seconds(7200) + Duration::milliseconds(1);
        assert_eq!(parking_cost(start(), end, 10.0).unwrap().cost, 30.0);
    }

    #[test]
    fn short_stays_bill_one_hour() {
        assert_eq!(billable_hours(start(), start() + Duration::seconds(1)).unwrap(), 1);
        assert_eq!(billable_hours(start(), start()).unwrap(), 1);
    }

    #[test]
    fn charge_carries_hours_and_cost() {
        let end = start() + Duration::minutes(150);
        assert_eq!(
            parking_cost(start(), end, 12.5).unwrap(),
            Charge {
                hours: 3,
                cost: 37.5
            }
        );
    }

    #[test]
    fn release_before_parking_is_rejected() {
        let end = start() - Duration::seconds(1);
        assert!(matches!(
            billable_hours(start(), end),
            Err(ParkadeError::Validation { .. })
        ));
        assert!(parking_cost(start(), end, 10.0).is_err());
    }
}
