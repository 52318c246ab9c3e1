//! Reducer: collapses a provider's raw payload into the unified report.
//!
//! The per-provider walks live next to their payload structs in the
//! provider modules; this module owns the dispatch and the shared pure
//! helpers (compass bucketing, zero-decimal rendering, calendar fields,
//! day/night determination). Reduction takes `now` as a parameter and has
//! no suspension points, so it is pure, synchronous and idempotent.

use chrono::{DateTime, Local, NaiveDateTime};
use serde_json::Value;

use crate::error::ReductionError;
use crate::model::{Query, ReducedReport};
use crate::provider::{self, ProviderId};

pub(crate) const DATE_FMT: &str = "%Y-%m-%d";
pub(crate) const DAY_TEXT_FMT: &str = "%a, %d.";

/// Compass signs, one per 45° bucket starting at north. Rendered with the
/// arrow glyph first; the markup export keeps only the letter part.
const COMPASS: [&str; 8] = ["↓ N", "↙ NE", "← E", "↖ SE", "↑ S", "↗ SW", "→ W", "↘ NW"];

/// Reduce `payload` (as fetched by `provider`) into the unified report.
///
/// Any required field that is missing beyond repair aborts the whole
/// reduction; there is no partial report.
pub fn reduce(
    provider: ProviderId,
    payload: &Value,
    query: &Query,
    now: DateTime<Local>,
) -> Result<ReducedReport, ReductionError> {
    match provider {
        ProviderId::Msn => provider::msn::reduce(payload, query, now),
        ProviderId::OpenMeteo => provider::openmeteo::reduce(payload, query, now),
        ProviderId::OpenWeather => provider::openweather::reduce(payload, query, now),
    }
}

/// Map a wind bearing in degrees onto one of eight compass signs.
///
/// Negative bearings (the providers' "no data" convention) map to `"."`.
/// The bucket index is `round(degrees % 360 / 45 % 7.5)` with ties
/// rounding to even, so 360° folds back onto north and the mapping is
/// periodic with period 360.
pub fn direction_sign(degree: f64) -> String {
    if degree < 0.0 {
        return ".".to_string();
    }
    let idx = ((degree % 360.0) / 45.0 % 7.5).round_ties_even() as usize;
    COMPASS[idx].to_string()
}

/// Render a number as a decimal string with zero fractional digits.
pub(crate) fn fmt0(value: f64) -> String {
    format!("{value:.0}")
}

/// The calendar fields attached to every report entry.
pub(crate) struct DayFields {
    pub day_text: String,
    pub day: String,
    pub short_day: String,
    pub date: String,
}

pub(crate) fn day_fields(date: NaiveDateTime) -> DayFields {
    DayFields {
        day_text: date.format(DAY_TEXT_FMT).to_string(),
        day: date.format("%A").to_string(),
        short_day: date.format("%a").to_string(),
        date: date.format(DATE_FMT).to_string(),
    }
}

/// Night iff `now` lies outside the sunrise..sunset window.
pub(crate) fn is_night(now: NaiveDateTime, sunrise: NaiveDateTime, sunset: NaiveDateTime) -> bool {
    now < sunrise || now > sunset
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn direction_sign_negative_is_dot() {
        assert_eq!(direction_sign(-1.0), ".");
        assert_eq!(direction_sign(-0.01), ".");
    }

    #[test]
    fn direction_sign_is_periodic() {
        assert_eq!(direction_sign(0.0), direction_sign(360.0));
        assert_eq!(direction_sign(90.0), direction_sign(450.0));
        assert_eq!(direction_sign(180.0), direction_sign(540.0));
    }

    #[test]
    fn direction_sign_buckets() {
        assert_eq!(direction_sign(0.0), "↓ N");
        assert_eq!(direction_sign(45.0), "↙ NE");
        assert_eq!(direction_sign(90.0), "← E");
        assert_eq!(direction_sign(180.0), "↑ S");
        assert_eq!(direction_sign(270.0), "→ W");
        assert_eq!(direction_sign(315.0), "↘ NW");
        // The top of the last bucket folds back onto north.
        assert_eq!(direction_sign(350.0), "↓ N");
    }

    #[test]
    fn fmt0_rounds_ties_to_even() {
        assert_eq!(fmt0(20.5), "20");
        assert_eq!(fmt0(21.5), "22");
        assert_eq!(fmt0(-3.4), "-3");
        assert_eq!(fmt0(7.0), "7");
    }

    #[test]
    fn day_fields_formats() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let fields = day_fields(date);
        assert_eq!(fields.date, "2026-08-06");
        assert_eq!(fields.day, "Thursday");
        assert_eq!(fields.short_day, "Thu");
        assert_eq!(fields.day_text, "Thu, 06.");
    }

    #[test]
    fn night_outside_sun_window() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let sunrise = d.and_hms_opt(5, 30, 0).unwrap();
        let sunset = d.and_hms_opt(20, 45, 0).unwrap();

        assert!(is_night(d.and_hms_opt(4, 0, 0).unwrap(), sunrise, sunset));
        assert!(!is_night(d.and_hms_opt(12, 0, 0).unwrap(), sunrise, sunset));
        assert!(is_night(d.and_hms_opt(22, 0, 0).unwrap(), sunrise, sunset));
    }
}
