//! Open-Meteo provider: keyless, parallel `hourly`/`daily` array payload.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::{FetchError, ReductionError};
use crate::icons;
use crate::model::{CurrentConditions, DayForecast, FORECAST_DAYS, Query, ReducedReport};
use crate::reduce::{day_fields, direction_sign, fmt0, is_night};

use super::{ProviderId, WeatherProvider};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY_FIELDS: &str = "temperature_2m,relativehumidity_2m,apparent_temperature,weathercode,\
                             windspeed_10m,winddirection_10m,precipitation_probability,\
                             pressure_msl,uv_index,visibility";
const DAILY_FIELDS: &str = "sunrise,sunset,weathercode,precipitation_probability_max,\
                            temperature_2m_max,temperature_2m_min,uv_index_max";

/// Coarse UTC-offset → representative IANA zone for the API's `timezone`
/// parameter. Good enough for hour alignment of the returned arrays.
const TIMEZONES: &[(&str, &str)] = &[
    ("-06", "America/Anchorage"),
    ("-05", "America/Los_Angeles"),
    ("-04", "America/Denver"),
    ("-03", "America/Chicago"),
    ("-02", "America/New_York"),
    ("-01", "America/Sao_Paulo"),
    ("+00", "Europe/London"),
    ("+01", "Europe/Berlin"),
    ("+02", "Europe/Moscow"),
    ("+03", "Africa/Cairo"),
    ("+04", "Asia/Bangkok"),
    ("+05", "Asia/Singapore"),
    ("+06", "Asia/Tokyo"),
    ("+07", "Australia/Sydney"),
    ("+08", "Pacific/Auckland"),
];

#[derive(Debug, Clone, Default)]
pub struct OpenMeteoProvider;

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self
    }

    fn current_zone() -> &'static str {
        let offset = Local::now().format("%z").to_string();
        let key = offset.get(..3).unwrap_or("+01");
        TIMEZONES
            .iter()
            .find(|(prefix, _)| *prefix == key)
            .map(|(_, zone)| *zone)
            .unwrap_or("Europe/Berlin")
    }

    fn forecast_url(query: &Query) -> String {
        let (windspeed_unit, temperature_unit) = if query.units.is_imperial() {
            ("mph", "fahrenheit")
        } else {
            ("kmh", "celsius")
        };
        format!(
            "{FORECAST_URL}?longitude={}&latitude={}&hourly={HOURLY_FIELDS}&daily={DAILY_FIELDS}\
             &timezone={}&windspeed_unit={windspeed_unit}&temperature_unit={temperature_unit}",
            query.geodata.longitude,
            query.geodata.latitude,
            Self::current_zone(),
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn fetch(&self, fetcher: &dyn crate::fetch::Fetch, query: &Query) -> Result<Value, FetchError> {
        info!("accessing Open-Meteo for weather data");
        fetcher.get_json(&Self::forecast_url(query)).await
    }
}

// ---------------------------------------------------------------------------
// Payload shape: index-parallel arrays, one slot per hour/day offset.

#[derive(Debug, Deserialize)]
struct OmPayload {
    longitude: f64,
    latitude: f64,
    hourly_units: OmHourlyUnits,
    hourly: OmHourly,
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmHourlyUnits {
    temperature_2m: String,
    windspeed_10m: String,
    precipitation_probability: String,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    relativehumidity_2m: Vec<f64>,
    apparent_temperature: Vec<f64>,
    weathercode: Vec<i64>,
    windspeed_10m: Vec<f64>,
    winddirection_10m: Vec<f64>,
    precipitation_probability: Vec<f64>,
    #[serde(default)]
    pressure_msl: Vec<f64>,
    #[serde(default)]
    uv_index: Vec<f64>,
    #[serde(default)]
    visibility: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    sunrise: Vec<String>,
    sunset: Vec<String>,
    weathercode: Vec<i64>,
    precipitation_probability_max: Vec<f64>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    uv_index_max: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Reduction.

/// Upstream hourly stamps have minute precision ("2026-08-06T14:00");
/// daily stamps are bare dates.
fn parse_naive(field: &'static str, value: &str) -> Result<NaiveDateTime, ReductionError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|err| ReductionError::invalid(ProviderId::OpenMeteo, field, err))
}

/// Attach the local offset and render as an ISO timestamp.
fn localized_iso(naive: NaiveDateTime) -> String {
    match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        None => naive.format("%Y-%m-%dT%H:%M:%S").to_string(),
    }
}

fn at(values: &[f64], idx: usize, field: &'static str) -> Result<f64, ReductionError> {
    values
        .get(idx)
        .copied()
        .ok_or_else(|| ReductionError::missing(ProviderId::OpenMeteo, field))
}

/// Mean of one calendar day's 24 hourly samples, if fully present.
fn daily_mean(values: &[f64], day: usize) -> Option<f64> {
    let slice = values.get(day * 24..(day + 1) * 24)?;
    Some(slice.iter().sum::<f64>() / slice.len() as f64)
}

pub(crate) fn reduce(
    payload: &Value,
    query: &Query,
    now: DateTime<Local>,
) -> Result<ReducedReport, ReductionError> {
    let payload: OmPayload = Deserialize::deserialize(payload)
        .map_err(|err| ReductionError::invalid(ProviderId::OpenMeteo, "payload", err))?;

    let hourly = &payload.hourly;
    let daily = &payload.daily;

    // Upstream stamps are rounded to the hour, so "now" is located by a
    // loose prefix match against the hourly time axis, not an exact
    // lookup.
    let hour_stamp = now.format("%Y-%m-%dT%H:00").to_string();
    let idx = hourly
        .time
        .iter()
        .position(|t| t.contains(&hour_stamp))
        .ok_or_else(|| ReductionError::missing(ProviderId::OpenMeteo, "hourly.time (current hour)"))?;

    let sunrise_raw = daily
        .sunrise
        .first()
        .ok_or_else(|| ReductionError::missing(ProviderId::OpenMeteo, "daily.sunrise"))?;
    let sunset_raw = daily
        .sunset
        .first()
        .ok_or_else(|| ReductionError::missing(ProviderId::OpenMeteo, "daily.sunset"))?;
    let sunrise = parse_naive("daily.sunrise", sunrise_raw)?;
    let sunset = parse_naive("daily.sunset", sunset_raw)?;

    let provider_code = hourly
        .weathercode
        .get(idx)
        .ok_or_else(|| ReductionError::missing(ProviderId::OpenMeteo, "hourly.weathercode"))?
        .to_string();
    let icon = icons::convert_code(ProviderId::OpenMeteo, &provider_code);

    let wind_dir = at(&hourly.winddirection_10m, idx, "hourly.winddirection_10m")?;
    let currdate = parse_naive("hourly.time", &hourly.time[idx])?;
    let calendar = day_fields(currdate);

    let min_temp = at(&daily.temperature_2m_min, 0, "daily.temperature_2m_min")?;
    let max_temp = at(&daily.temperature_2m_max, 0, "daily.temperature_2m_max")?;

    let current = CurrentConditions {
        observation_point: query.geodata.name.clone(),
        observation_time: now.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        sunrise: localized_iso(sunrise),
        sunset: localized_iso(sunset),
        is_night: is_night(now.naive_local(), sunrise, sunset),
        provider_code,
        yahoo_code: icon.yahoo.to_string(),
        meteo_code: icon.meteo.to_string(),
        temp: fmt0(at(&hourly.temperature_2m, idx, "hourly.temperature_2m")?),
        feels_like: fmt0(at(&hourly.apparent_temperature, idx, "hourly.apparent_temperature")?),
        humidity: fmt0(at(&hourly.relativehumidity_2m, idx, "hourly.relativehumidity_2m")?),
        wind_speed: fmt0(at(&hourly.windspeed_10m, idx, "hourly.windspeed_10m")?),
        wind_dir: wind_dir.to_string(),
        wind_dir_sign: direction_sign(wind_dir),
        pressure: hourly.pressure_msl.get(idx).copied().map(fmt0),
        uv_index: hourly.uv_index.get(idx).copied().map(fmt0),
        visibility: hourly.visibility.get(idx).copied().map(fmt0),
        min_temp: fmt0(min_temp),
        max_temp: fmt0(max_temp),
        precipitation: fmt0(at(
            &hourly.precipitation_probability,
            idx,
            "hourly.precipitation_probability",
        )?),
        day_text: calendar.day_text,
        day: calendar.day,
        short_day: calendar.short_day,
        date: calendar.date,
        text: None,
        raintext: None,
    };

    let mut forecast = Vec::with_capacity(FORECAST_DAYS);
    for day in 0..FORECAST_DAYS {
        let code = daily
            .weathercode
            .get(day)
            .ok_or_else(|| ReductionError::missing(ProviderId::OpenMeteo, "daily.weathercode"))?
            .to_string();
        let icon = icons::convert_code(ProviderId::OpenMeteo, &code);
        let date_raw = daily
            .time
            .get(day)
            .ok_or_else(|| ReductionError::missing(ProviderId::OpenMeteo, "daily.time"))?;
        let calendar = day_fields(parse_naive("daily.time", date_raw)?);

        forecast.push(DayForecast {
            provider_code: Some(code),
            yahoo_code: Some(icon.yahoo.to_string()),
            meteo_code: Some(icon.meteo.to_string()),
            min_temp: fmt0(at(&daily.temperature_2m_min, day, "daily.temperature_2m_min")?),
            max_temp: fmt0(at(&daily.temperature_2m_max, day, "daily.temperature_2m_max")?),
            precipitation: fmt0(at(
                &daily.precipitation_probability_max,
                day,
                "daily.precipitation_probability_max",
            )?),
            pressure: daily_mean(&hourly.pressure_msl, day).map(fmt0),
            uv_index: daily.uv_index_max.get(day).copied().map(fmt0),
            day_text: Some(calendar.day_text),
            day: calendar.day,
            short_day: calendar.short_day,
            date: calendar.date,
            text: None,
            day_summary0: None,
            day_summary1: None,
            night_summary0: None,
            night_summary1: None,
            umbrella_index: None,
        });
    }

    Ok(ReducedReport {
        source: ProviderId::OpenMeteo.source_label().to_string(),
        name: query.geodata.display_name(),
        longitude: payload.longitude.to_string(),
        latitude: payload.latitude.to_string(),
        tempunit: payload.hourly_units.temperature_2m.clone(),
        windunit: payload.hourly_units.windspeed_10m.clone(),
        precunit: payload.hourly_units.precipitation_probability.clone(),
        current,
        forecast,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::GeoData;
    use chrono::{Duration, Timelike};
    use serde_json::json;

    /// Hourly arrays cover today; the slot matching `now`'s hour carries
    /// distinctive values so index-matching is observable.
    pub(crate) fn fixture(now: DateTime<Local>) -> Value {
        let today = now.date_naive();
        let hour = now.hour() as usize;

        let times: Vec<String> =
            (0..24).map(|h| format!("{}T{h:02}:00", today.format("%Y-%m-%d"))).collect();
        let mut temperatures = vec![10.0; 24];
        temperatures[hour] = 21.0;
        let mut codes = vec![0i64; 24];
        codes[hour] = 3;

        let daily_time: Vec<String> =
            (0..6).map(|d| (today + Duration::days(d)).format("%Y-%m-%d").to_string()).collect();

        json!({
            "longitude": 13.41,
            "latitude": 52.52,
            "hourly_units": {
                "temperature_2m": "°C",
                "windspeed_10m": "km/h",
                "precipitation_probability": "%"
            },
            "hourly": {
                "time": times,
                "temperature_2m": temperatures,
                "relativehumidity_2m": vec![55.0; 24],
                "apparent_temperature": vec![11.0; 24],
                "weathercode": codes,
                "windspeed_10m": vec![14.0; 24],
                "winddirection_10m": vec![270.0; 24],
                "precipitation_probability": vec![35.0; 24],
                "pressure_msl": vec![1013.0; 24],
                "uv_index": vec![4.0; 24],
                "visibility": vec![24140.0; 24]
            },
            "daily": {
                "time": daily_time,
                "sunrise": [format!("{}T05:58", today.format("%Y-%m-%d"))],
                "sunset": [format!("{}T20:45", today.format("%Y-%m-%d"))],
                "weathercode": [3, 0, 1, 2, 61, 95],
                "precipitation_probability_max": [40.0, 5.0, 10.0, 15.0, 80.0, 90.0],
                "temperature_2m_max": [24.0, 25.0, 22.0, 23.0, 21.0, 22.0],
                "temperature_2m_min": [12.0, 13.0, 11.0, 12.0, 14.0, 13.0],
                "uv_index_max": [5.0, 6.0, 4.0, 5.0, 3.0, 2.0]
            }
        })
    }

    pub(crate) fn query() -> Query {
        Query::new(GeoData::new("Berlin, Deutschland", 13.41, 52.52))
    }

    #[test]
    fn current_is_taken_at_the_matched_hourly_index() {
        let now = Local::now();
        let report = reduce(&fixture(now), &query(), now).unwrap();

        // weathercode 3 maps to ("28", "N").
        assert_eq!(report.current.provider_code, "3");
        assert_eq!(report.current.yahoo_code, "28");
        assert_eq!(report.current.meteo_code, "N");
        // The matched slot's temperature, not element zero.
        assert_eq!(report.current.temp, "21");
        assert_eq!(report.current.wind_dir_sign, "→ W");
        assert_eq!(report.current.pressure.as_deref(), Some("1013"));
        assert_eq!(report.current.precipitation, "35");
    }

    #[test]
    fn forecast_has_six_days_with_daily_pressure_mean() {
        let now = Local::now();
        let report = reduce(&fixture(now), &query(), now).unwrap();

        assert_eq!(report.forecast.len(), FORECAST_DAYS);
        // Day 0 has a complete 24-sample pressure series; later days don't.
        assert_eq!(report.forecast[0].pressure.as_deref(), Some("1013"));
        assert!(report.forecast[1].pressure.is_none());
        assert_eq!(report.forecast[4].provider_code.as_deref(), Some("61"));
        assert_eq!(report.forecast[4].yahoo_code.as_deref(), Some("11"));
        assert_eq!(report.forecast[5].uv_index.as_deref(), Some("2"));

        let today = now.date_naive();
        for (idx, day) in report.forecast.iter().enumerate() {
            let expected = today + Duration::days(idx as i64);
            assert_eq!(day.date, expected.format("%Y-%m-%d").to_string());
        }
    }

    #[test]
    fn reduction_is_idempotent() {
        let now = Local::now();
        let payload = fixture(now);

        let first = reduce(&payload, &query(), now).unwrap();
        let second = reduce(&payload, &query(), now).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn missing_current_hour_aborts() {
        let now = Local::now();
        let mut payload = fixture(now);
        payload["hourly"]["time"] = json!(Vec::<String>::new());

        let err = reduce(&payload, &query(), now).unwrap_err();
        assert_eq!(err.field, "hourly.time (current hour)");
    }
}
