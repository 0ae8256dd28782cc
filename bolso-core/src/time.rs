//! Display-time helpers: every user-visible timestamp is rendered in
//! Brazil time (America/Sao_Paulo), regardless of how it is stored.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::Sao_Paulo;

/// "dd/mm/aaaa às HH:MM" in Brazil time.
pub fn format_datetime_br(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Sao_Paulo).format("%d/%m/%Y às %H:%M").to_string()
}

/// "dd/mm/aaaa" in Brazil time.
pub fn format_date_br(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Sao_Paulo).format("%d/%m/%Y").to_string()
}

/// Calendar date rendering for dates that are already local (due dates).
pub fn format_naive_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// The current calendar date in Brazil time.
pub fn today_br(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Sao_Paulo).date_naive()
}

/// Midnight of a Brazil-local calendar date, as UTC. Report periods are cut
/// on the Brazil day boundary, not the UTC one.
pub fn br_day_start_utc(date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match Sao_Paulo.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => DateTime::from_naive_utc_and_offset(midnight, Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_renders_in_brazil_time() {
        // 02:30 UTC is 23:30 of the previous day in São Paulo (UTC-3).
        let dt = DateTime::parse_from_rfc3339("2024-06-15T02:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_datetime_br(dt), "14/06/2024 às 23:30");
        assert_eq!(format_date_br(dt), "14/06/2024");
    }

    #[test]
    fn today_follows_the_brazil_day_boundary() {
        let dt = DateTime::parse_from_rfc3339("2024-06-15T01:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(today_br(dt), NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
    }

    #[test]
    fn day_start_is_3h_ahead_in_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(br_day_start_utc(date).to_rfc3339(), "2024-06-15T03:00:00+00:00");
    }
}
