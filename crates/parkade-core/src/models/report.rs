//! Read-only summaries derived from the store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reservation::Reservation;

/// One day of a reporting series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub reservations: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummary {
    pub total_users: u64,
    pub total_lots: u64,
    pub total_spots: u64,
    pub total_reservations: u64,
    pub booked_spots: u64,
    pub vacant_spots: u64,
    pub total_revenue: f64,
    /// Seven days ending today, oldest first.
    pub daily: Vec<DailyPoint>,
    pub recent_reservations: Vec<Reservation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub full_name: String,
    pub total_bookings: u64,
    pub active_bookings: u64,
    pub total_vehicles: u64,
    pub total_spent: f64,
    pub favourite_lot: Option<String>,
    /// Seven days ending today, oldest first.
    pub daily: Vec<DailyPoint>,
    pub recent_reservations: Vec<Reservation>,
}

/// A cached status flag that disagrees with the reservation table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProjectionMismatch {
    Spot {
        spot_id: Uuid,
        label: String,
        occupied: bool,
        active_reservations: u64,
    },
    Vehicle {
        vehicle_id: Uuid,
        plate: String,
        parked: bool,
        active_reservations: u64,
    },
}

/// Number of days covered by the dashboard series.
pub const SERIES_DAYS: u32 = 7;

/// Buckets `(parked_at, cost)` pairs into one point per day for the
/// `days` days ending on `today`, oldest first. Entries outside the
/// window are ignored; a missing cost counts as zero revenue.
pub fn daily_series<I>(today: NaiveDate, days: u32, entries: I) -> Vec<DailyPoint>
where
    I: IntoIterator<Item = (chrono::DateTime<chrono::Utc>, Option<f64>)>,
{
    let mut points: Vec<DailyPoint> = (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(chrono::Days::new(u64::from(back))))
        .map(|date| DailyPoint {
            date,
            reservations: 0,
            revenue: 0.0,
        })
        .collect();

    for (parked_at, cost) in entries {
        let day = parked_at.date_naive();
        if let Some(point) = points.iter_mut().find(|p| p.date == day) {
            point.reservations += 1;
            point.revenue += cost.unwrap_or(0.0);
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn series_covers_window_oldest_first() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let series = daily_series(today, SERIES_DAYS, Vec::new());
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
        assert_eq!(series[6].date, today);
    }

    #[test]
    fn entries_are_bucketed_by_parking_day() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let entries = vec![
            (Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap(), Some(20.0)),
            (Utc.with_ymd_and_hms(2025, 3, 14, 23, 59, 0).unwrap(), None),
            (Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap(), Some(5.5)),
            // Outside the window.
            (Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(), Some(99.0)),
        ];
        let series = daily_series(today, SERIES_DAYS, entries);
        assert_eq!(series[6].reservations, 2);
        assert_eq!(series[6].revenue, 20.0);
        assert_eq!(series[2].reservations, 1);
        assert_eq!(series[2].revenue, 5.5);
        assert_eq!(series.iter().map(|p| p.reservations).sum::<u64>(), 3);
    }
}
