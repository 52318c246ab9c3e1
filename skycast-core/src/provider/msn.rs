//! MSN weather provider: one combined current+forecast document.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Local};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::{FetchError, ReductionError};
use crate::icons;
use crate::model::{CurrentConditions, DayForecast, FORECAST_DAYS, Query, ReducedReport};
use crate::reduce::{day_fields, direction_sign, fmt0, is_night};

use super::{ProviderId, WeatherProvider};

const OVERVIEW_URL: &str = "https://api.msn.com/weatherfalcon/weather/overview";
const APP_ID: &str = "9e21380c-ff19-4c78-b4ea-19558e93a5d3";
const API_KEY: &str = "j5i4gDqHL6nGYwx5wi5kRhXjtf2c5qgFX9fzfk0TOo";

#[derive(Debug, Clone, Default)]
pub struct MsnProvider;

impl MsnProvider {
    pub fn new() -> Self {
        Self
    }

    fn overview_url(query: &Query) -> String {
        let tempunit = if query.units.is_imperial() { "F" } else { "C" };
        format!(
            "{OVERVIEW_URL}?&lon={}&lat={}&locale={}&units={}&appId={APP_ID}&apiKey={API_KEY}\
             &ocid=superapp-mini-weather&wrapOData=false&includenowcasting=true\
             &feature=lifeday&lifeDays={FORECAST_DAYS}",
            query.geodata.longitude, query.geodata.latitude, query.scheme, tempunit,
        )
    }
}

#[async_trait]
impl WeatherProvider for MsnProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Msn
    }

    async fn fetch(&self, fetcher: &dyn crate::fetch::Fetch, query: &Query) -> Result<Value, FetchError> {
        info!("accessing MSN for weather data");
        fetcher.get_json(&Self::overview_url(query)).await
    }
}

// ---------------------------------------------------------------------------
// Payload shape. Field presence is conditional upstream; everything the
// reduction can survive without is Option-typed.

#[derive(Debug, Deserialize)]
struct MsnPayload {
    responses: Vec<MsnResponse>,
    units: MsnUnits,
}

#[derive(Debug, Deserialize)]
struct MsnUnits {
    temperature: String,
    speed: String,
}

#[derive(Debug, Deserialize)]
struct MsnResponse {
    source: MsnSource,
    weather: Vec<MsnWeather>,
}

#[derive(Debug, Deserialize)]
struct MsnSource {
    coordinates: MsnCoordinates,
    location: MsnLocation,
}

#[derive(Debug, Deserialize)]
struct MsnCoordinates {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct MsnLocation {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "TimezoneOffset", default)]
    timezone_offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MsnWeather {
    current: MsnCurrent,
    forecast: MsnForecast,
    #[serde(default)]
    nowcasting: Option<MsnNowcasting>,
    #[serde(default)]
    alerts: Vec<String>,
    #[serde(rename = "lifeDaily", default)]
    life_daily: Option<MsnLifeDaily>,
}

#[derive(Debug, Deserialize)]
struct MsnCurrent {
    created: String,
    symbol: String,
    temp: f64,
    feels: f64,
    rh: f64,
    #[serde(rename = "windSpd")]
    wind_spd: f64,
    #[serde(rename = "windDir")]
    wind_dir: f64,
    #[serde(default)]
    baro: Option<f64>,
    #[serde(default)]
    uv: Option<f64>,
    #[serde(default)]
    vis: Option<f64>,
    #[serde(rename = "capAbbr")]
    cap_abbr: String,
}

#[derive(Debug, Deserialize)]
struct MsnForecast {
    days: Vec<MsnDay>,
}

#[derive(Debug, Deserialize)]
struct MsnDay {
    almanac: MsnAlmanac,
    daily: MsnDaily,
    #[serde(default)]
    hourly: Vec<MsnHourly>,
}

#[derive(Debug, Deserialize)]
struct MsnAlmanac {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct MsnDaily {
    symbol: String,
    #[serde(rename = "tempLo")]
    temp_lo: f64,
    #[serde(rename = "tempHi")]
    temp_hi: f64,
    #[serde(rename = "pvdrCap")]
    pvdr_cap: String,
    day: MsnDayPart,
    night: MsnDayPart,
}

#[derive(Debug, Deserialize)]
struct MsnDayPart {
    precip: f64,
    #[serde(default)]
    summaries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MsnHourly {
    symbol: String,
    #[serde(rename = "pvdrCap")]
    pvdr_cap: String,
}

#[derive(Debug, Deserialize)]
struct MsnNowcasting {
    summary: String,
}

#[derive(Debug, Deserialize)]
struct MsnLifeDaily {
    days: Vec<MsnLifeDay>,
}

#[derive(Debug, Deserialize)]
struct MsnLifeDay {
    #[serde(rename = "umbrellaIndex")]
    umbrella_index: MsnUmbrellaIndex,
}

#[derive(Debug, Deserialize)]
struct MsnUmbrellaIndex {
    #[serde(default)]
    summary: Option<String>,
    #[serde(rename = "longSummary2", default)]
    long_summary2: Option<String>,
}

// ---------------------------------------------------------------------------
// Reduction.

fn parse_iso(provider_field: &'static str, value: &str) -> Result<DateTime<FixedOffset>, ReductionError> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|err| ReductionError::invalid(ProviderId::Msn, provider_field, err))
}

pub(crate) fn reduce(
    payload: &Value,
    query: &Query,
    now: DateTime<Local>,
) -> Result<ReducedReport, ReductionError> {
    let payload: MsnPayload = Deserialize::deserialize(payload)
        .map_err(|err| ReductionError::invalid(ProviderId::Msn, "payload", err))?;

    let response = payload
        .responses
        .first()
        .ok_or_else(|| ReductionError::missing(ProviderId::Msn, "responses"))?;
    let weather = response
        .weather
        .first()
        .ok_or_else(|| ReductionError::missing(ProviderId::Msn, "weather"))?;
    let days = &weather.forecast.days;
    if days.len() < FORECAST_DAYS {
        return Err(ReductionError::missing(ProviderId::Msn, "forecast.days"));
    }

    let current = &weather.current;
    let today = &days[0];

    let sunrise = parse_iso("almanac.sunrise", &today.almanac.sunrise)?;
    let sunset = parse_iso("almanac.sunset", &today.almanac.sunset)?;
    let created = parse_iso("current.created", &current.created)?;

    // The first hourly slot is fresher than the current block when present.
    let (provider_code, text) = match today.hourly.first() {
        Some(hourly) => (hourly.symbol.clone(), hourly.pvdr_cap.clone()),
        None => (current.symbol.clone(), current.cap_abbr.clone()),
    };
    let icon = icons::convert_code(ProviderId::Msn, &provider_code);

    let tempunit = payload.units.temperature.replace('\u{200e}', "");
    let calendar = day_fields(created.naive_local());

    let current_conditions = CurrentConditions {
        observation_point: response.source.location.name.clone(),
        observation_time: current.created.clone(),
        sunrise: today.almanac.sunrise.clone(),
        sunset: today.almanac.sunset.clone(),
        is_night: is_night(now.naive_local(), sunrise.naive_local(), sunset.naive_local()),
        provider_code,
        yahoo_code: icon.yahoo.to_string(),
        meteo_code: icon.meteo.to_string(),
        temp: fmt0(current.temp),
        feels_like: fmt0(current.feels),
        humidity: fmt0(current.rh),
        wind_speed: fmt0(current.wind_spd),
        wind_dir: current.wind_dir.to_string(),
        wind_dir_sign: direction_sign(current.wind_dir),
        pressure: current.baro.map(fmt0),
        uv_index: current.uv.map(fmt0),
        visibility: current.vis.map(fmt0),
        min_temp: fmt0(today.daily.temp_lo),
        max_temp: fmt0(today.daily.temp_hi),
        precipitation: fmt0(today.daily.day.precip),
        day_text: calendar.day_text,
        day: calendar.day,
        short_day: calendar.short_day,
        date: calendar.date,
        text: Some(text),
        raintext: weather.nowcasting.as_ref().map(|n| n.summary.clone()),
    };

    // The umbrella index is only published for the current day; it is
    // repeated across the forecast entries.
    let umbrella = weather.life_daily.as_ref().and_then(|life| life.days.first()).map(|day| {
        day.umbrella_index
            .long_summary2
            .clone()
            .or_else(|| day.umbrella_index.summary.clone())
            .unwrap_or_default()
    });

    let mut forecast = Vec::with_capacity(FORECAST_DAYS);
    let mut currdate = created;
    for day in days.iter().take(FORECAST_DAYS) {
        let icon = icons::convert_code(ProviderId::Msn, &day.daily.symbol);
        let calendar = day_fields(currdate.naive_local());
        forecast.push(DayForecast {
            provider_code: Some(day.daily.symbol.clone()),
            yahoo_code: Some(icon.yahoo.to_string()),
            meteo_code: Some(icon.meteo.to_string()),
            min_temp: fmt0(day.daily.temp_lo),
            max_temp: fmt0(day.daily.temp_hi),
            precipitation: fmt0(day.daily.day.precip),
            pressure: None,
            uv_index: None,
            day_text: Some(calendar.day_text),
            day: calendar.day,
            short_day: calendar.short_day,
            date: calendar.date,
            text: Some(day.daily.pvdr_cap.clone()),
            day_summary0: day.daily.day.summaries.first().cloned(),
            day_summary1: day
                .daily
                .day
                .summaries
                .get(1)
                .map(|s| s.replace("°.", &format!(" {tempunit}."))),
            night_summary0: day.daily.night.summaries.first().cloned(),
            night_summary1: day
                .daily
                .night
                .summaries
                .get(1)
                .map(|s| s.replace("°.", &format!(" {tempunit}."))),
            umbrella_index: umbrella.clone(),
        });
        currdate += Duration::days(1);
    }

    Ok(ReducedReport {
        source: ProviderId::Msn.source_label().to_string(),
        name: query.geodata.display_name(),
        longitude: response.source.coordinates.lon.to_string(),
        latitude: response.source.coordinates.lat.to_string(),
        tempunit,
        windunit: payload.units.speed.clone(),
        precunit: "%".to_string(),
        current: current_conditions,
        forecast,
    })
}

// ---------------------------------------------------------------------------
// Markup view: the flat attribute set the XML exporter renders. Parsing
// stays here with the payload shape; rendering lives in `export`.

#[derive(Debug)]
pub(crate) struct MarkupDoc {
    pub location_name: String,
    pub degree_type: String,
    pub longitude: String,
    pub latitude: String,
    pub timezone: String,
    pub alert: String,
    pub current: MarkupCurrent,
    pub forecast: Vec<MarkupDay>,
}

#[derive(Debug)]
pub(crate) struct MarkupCurrent {
    pub temperature: String,
    pub yahoo_code: String,
    pub meteo_code: String,
    pub sky_text: String,
    pub date: String,
    pub observation_time: String,
    pub observation_point: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind_display: String,
    pub day: String,
    pub short_day: String,
    pub wind_speed: String,
    pub precip: String,
}

#[derive(Debug)]
pub(crate) struct MarkupDay {
    pub low: String,
    pub high: String,
    pub yahoo_code: String,
    pub meteo_code: String,
    pub sky_text: String,
    pub date: String,
    pub day: String,
    pub short_day: String,
    pub precip: String,
}

pub(crate) fn markup_document(
    payload: &Value,
    query: &Query,
) -> Result<MarkupDoc, ReductionError> {
    let payload: MsnPayload = Deserialize::deserialize(payload)
        .map_err(|err| ReductionError::invalid(ProviderId::Msn, "payload", err))?;

    let response = payload
        .responses
        .first()
        .ok_or_else(|| ReductionError::missing(ProviderId::Msn, "responses"))?;
    let weather = response
        .weather
        .first()
        .ok_or_else(|| ReductionError::missing(ProviderId::Msn, "weather"))?;
    let days = &weather.forecast.days;
    if days.len() < FORECAST_DAYS {
        return Err(ReductionError::missing(ProviderId::Msn, "forecast.days"));
    }

    let current = &weather.current;
    let today = &days[0];
    let created = parse_iso("current.created", &current.created)?;
    let icon = icons::convert_code(ProviderId::Msn, &current.symbol);

    let sky_text = match today.hourly.first() {
        Some(hourly) => hourly.pvdr_cap.clone(),
        None => current.cap_abbr.clone(),
    };
    let wind_speed = format!("{} {}", fmt0(current.wind_spd), payload.units.speed);
    let sign = direction_sign(current.wind_dir);
    let wind_display = format!("{} {}", wind_speed, sign.chars().skip(2).collect::<String>());

    let markup_current = MarkupCurrent {
        temperature: fmt0(current.temp),
        yahoo_code: icon.yahoo.to_string(),
        meteo_code: icon.meteo.to_string(),
        sky_text,
        date: created.format(crate::reduce::DATE_FMT).to_string(),
        observation_time: created.format("%X").to_string(),
        observation_point: response.source.location.name.clone(),
        feels_like: fmt0(current.feels),
        humidity: fmt0(current.rh),
        wind_display,
        day: created.format("%A").to_string(),
        short_day: created.format("%a").to_string(),
        wind_speed,
        precip: fmt0(today.daily.day.precip),
    };

    let mut forecast = Vec::with_capacity(FORECAST_DAYS);
    let mut currdate = created;
    for day in days.iter().take(FORECAST_DAYS) {
        let icon = icons::convert_code(ProviderId::Msn, &day.daily.symbol);
        forecast.push(MarkupDay {
            low: fmt0(day.daily.temp_lo),
            high: fmt0(day.daily.temp_hi),
            yahoo_code: icon.yahoo.to_string(),
            meteo_code: icon.meteo.to_string(),
            sky_text: day.daily.pvdr_cap.clone(),
            date: currdate.format(crate::reduce::DATE_FMT).to_string(),
            day: currdate.format("%A").to_string(),
            short_day: currdate.format("%a").to_string(),
            precip: fmt0(day.daily.day.precip),
        });
        currdate += Duration::days(1);
    }

    // "02:00:00" and "-05:00:00" both carry the hour in the leading pair.
    let timezone = response
        .source
        .location
        .timezone_offset
        .as_deref()
        .and_then(|offset| offset.get(..2))
        .and_then(|hh| hh.parse::<i32>().ok())
        .unwrap_or(0)
        .to_string();

    Ok(MarkupDoc {
        location_name: query.geodata.display_name(),
        degree_type: payload.units.temperature.clone(),
        longitude: format!("{:.3}", response.source.coordinates.lon),
        latitude: format!("{:.3}", response.source.coordinates.lat),
        timezone,
        alert: weather.alerts.join(", "),
        current: markup_current,
        forecast,
    })
}
