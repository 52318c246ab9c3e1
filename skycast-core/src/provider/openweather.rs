//! OpenWeatherMap provider (deprecated upstream, still supported).
//!
//! Two endpoint calls — current weather plus the 5-day/3-hour forecast —
//! are merged into one payload. The forecast reduction buckets the
//! 3-hour series into calendar days by literal time-of-day substrings;
//! that shape is an artifact of the upstream API and is kept exactly for
//! output compatibility.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{FetchError, ReductionError};
use crate::icons;
use crate::model::{CurrentConditions, DayForecast, FORECAST_DAYS, Query, ReducedReport};
use crate::reduce::{DATE_FMT, day_fields, direction_sign, fmt0, is_night};

use super::{ProviderId, WeatherProvider};

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }

    fn url(&self, base: &str, query: &Query) -> String {
        let lang = query.scheme.get(..2).unwrap_or("en");
        match &query.city_id {
            // The numeric city id is deprecated upstream but still honored.
            Some(id) => format!(
                "{base}?id={id}&units={}&lang={lang}&appid={}",
                query.units, self.api_key
            ),
            None => format!(
                "{base}?&lon={}&lat={}&units={}&lang={lang}&appid={}",
                query.geodata.longitude, query.geodata.latitude, query.units, self.api_key
            ),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn fetch(&self, fetcher: &dyn crate::fetch::Fetch, query: &Query) -> Result<Value, FetchError> {
        info!("accessing OWM for weather data");
        let current = fetcher.get_json(&self.url(CURRENT_URL, query)).await?;
        let forecast = fetcher.get_json(&self.url(FORECAST_URL, query)).await?;
        Ok(json!({ "current": current, "forecast": forecast }))
    }
}

// ---------------------------------------------------------------------------
// Payload shape (merged document).

#[derive(Debug, Deserialize)]
struct OwmPayload {
    current: OwmCurrentDoc,
    forecast: OwmForecastDoc,
}

#[derive(Debug, Deserialize)]
struct OwmCurrentDoc {
    dt: i64,
    main: OwmCurrentMain,
    weather: Vec<OwmCondition>,
    wind: OwmWind,
    #[serde(default)]
    visibility: Option<f64>,
    #[serde(default)]
    sys: Option<OwmSys>,
}

#[derive(Debug, Deserialize)]
struct OwmCurrentMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    #[serde(default)]
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    id: i64,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    sunrise: Option<i64>,
    #[serde(default)]
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastDoc {
    city: OwmCity,
    list: Vec<OwmSlot>,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    coord: OwmCoord,
    #[serde(default)]
    sunrise: Option<i64>,
    #[serde(default)]
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct OwmSlot {
    dt: i64,
    dt_txt: String,
    main: OwmSlotMain,
    weather: Vec<OwmCondition>,
    #[serde(default)]
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmSlotMain {
    temp_min: f64,
    temp_max: f64,
}

// ---------------------------------------------------------------------------
// Reduction.

fn ts_local(field: &'static str, ts: i64) -> Result<DateTime<Local>, ReductionError> {
    DateTime::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(&Local))
        .ok_or_else(|| ReductionError::invalid(ProviderId::OpenWeather, field, "timestamp out of range"))
}

/// Running accumulator for one calendar day of 3-hour slots.
#[derive(Debug, Default, Clone)]
struct DayAcc {
    touched: bool,
    tmin: Option<f64>,
    tmax: Option<f64>,
    prec: Vec<f64>,
    yahoo: Option<String>,
    meteo: Option<String>,
    text: Option<String>,
}

impl DayAcc {
    fn absorb(&mut self, slot: &OwmSlot) {
        self.touched = true;
        self.tmin = Some(self.tmin.map_or(slot.main.temp_min, |t| t.min(slot.main.temp_min)));
        self.tmax = Some(self.tmax.map_or(slot.main.temp_max, |t| t.max(slot.main.temp_max)));
        self.prec.push(slot.pop.unwrap_or(0.0));
    }

    fn take_icon(&mut self, slot: &OwmSlot) {
        if let Some(condition) = slot.weather.first() {
            let icon = icons::convert_code(ProviderId::OpenWeather, &condition.id.to_string());
            if !icon.is_na() {
                self.yahoo = Some(icon.yahoo.to_string());
                self.meteo = Some(icon.meteo.to_string());
            }
        }
    }

    fn precipitation(&self) -> String {
        if self.prec.is_empty() {
            String::new()
        } else {
            fmt0(self.prec.iter().sum::<f64>() / self.prec.len() as f64 * 100.0)
        }
    }
}

pub(crate) fn reduce(
    payload: &Value,
    query: &Query,
    now: DateTime<Local>,
) -> Result<ReducedReport, ReductionError> {
    let payload: OwmPayload = Deserialize::deserialize(payload)
        .map_err(|err| ReductionError::invalid(ProviderId::OpenWeather, "payload", err))?;

    let current = &payload.current;
    let city = &payload.forecast.city;

    let condition = current
        .weather
        .first()
        .ok_or_else(|| ReductionError::missing(ProviderId::OpenWeather, "current.weather"))?;
    let provider_code = condition.id.to_string();
    let icon = icons::convert_code(ProviderId::OpenWeather, &provider_code);

    // The dedicated current endpoint carries sunrise/sunset; the forecast
    // document's city block is the fallback.
    let sunrise_ts = current
        .sys
        .as_ref()
        .and_then(|sys| sys.sunrise)
        .or(city.sunrise)
        .ok_or_else(|| ReductionError::missing(ProviderId::OpenWeather, "sys.sunrise"))?;
    let sunset_ts = current
        .sys
        .as_ref()
        .and_then(|sys| sys.sunset)
        .or(city.sunset)
        .ok_or_else(|| ReductionError::missing(ProviderId::OpenWeather, "sys.sunset"))?;
    let sunrise = ts_local("sys.sunrise", sunrise_ts)?;
    let sunset = ts_local("sys.sunset", sunset_ts)?;

    // Metric responses carry m/s; km/h is the report contract. Imperial
    // responses already arrive in mph.
    let wind_speed = if query.units.is_imperial() {
        current.wind.speed
    } else {
        current.wind.speed * 3.6
    };

    let currdate = ts_local("current.dt", current.dt)?;
    let calendar = day_fields(currdate.naive_local());

    let mut report_current = CurrentConditions {
        observation_point: query.geodata.name.clone(),
        observation_time: now.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        sunrise: sunrise.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        sunset: sunset.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        is_night: is_night(now.naive_local(), sunrise.naive_local(), sunset.naive_local()),
        provider_code,
        yahoo_code: icon.yahoo.to_string(),
        meteo_code: icon.meteo.to_string(),
        temp: fmt0(current.main.temp),
        feels_like: fmt0(current.main.feels_like),
        humidity: fmt0(current.main.humidity),
        wind_speed: fmt0(wind_speed),
        wind_dir: fmt0(current.wind.deg),
        wind_dir_sign: direction_sign(current.wind.deg),
        pressure: current.main.pressure.map(fmt0),
        uv_index: None,
        visibility: current.visibility.map(fmt0),
        min_temp: String::new(),
        max_temp: String::new(),
        precipitation: String::new(),
        day_text: calendar.day_text,
        day: calendar.day,
        short_day: calendar.short_day,
        date: calendar.date,
        text: Some(condition.description.clone()),
        raintext: None,
    };

    let forecast = reduce_forecast(&payload.forecast.list)?;

    // Today's extremes only exist in the bucketed forecast.
    report_current.min_temp = forecast[0].min_temp.clone();
    report_current.max_temp = forecast[0].max_temp.clone();
    report_current.precipitation = forecast[0].precipitation.clone();

    Ok(ReducedReport {
        source: ProviderId::OpenWeather.source_label().to_string(),
        name: query.geodata.display_name(),
        longitude: city.coord.lon.to_string(),
        latitude: city.coord.lat.to_string(),
        tempunit: if query.units.is_imperial() { "°F" } else { "°C" }.to_string(),
        windunit: if query.units.is_imperial() { "mph" } else { "km/h" }.to_string(),
        precunit: "%".to_string(),
        current: report_current,
        forecast,
    })
}

/// Bucket the 3-hour series into calendar days.
///
/// "15:00:00" picks the representative icon, "18:00:00" backfills it for
/// late queries, "21:00:00" closes the day. A series that ends before the
/// final day closes is repaired from whatever was observed, falling back
/// to the previous day's values for the rest.
fn reduce_forecast(list: &[OwmSlot]) -> Result<Vec<DayForecast>, ReductionError> {
    let mut days: Vec<DayForecast> = Vec::with_capacity(FORECAST_DAYS);
    let mut acc = DayAcc::default();

    for slot in list {
        if days.len() == FORECAST_DAYS {
            break;
        }
        acc.absorb(slot);

        if slot.dt_txt.contains("15:00:00") {
            acc.take_icon(slot);
            acc.text = slot.weather.first().map(|w| w.description.clone());
        }
        if slot.dt_txt.contains("18:00:00") {
            acc.take_icon(slot);
            if acc.text.is_none() {
                acc.text = slot.weather.first().map(|w| w.description.clone());
            }
        }
        if slot.dt_txt.contains("21:00:00") {
            // Last slot before the day change: close out the day. Its
            // icon wins when the table knows it.
            acc.take_icon(slot);
            let currdate = ts_local("list.dt", slot.dt)?;
            let calendar = day_fields(currdate.naive_local());
            days.push(DayForecast {
                provider_code: slot.weather.first().map(|w| w.id.to_string()),
                yahoo_code: acc.yahoo.take(),
                meteo_code: acc.meteo.take(),
                min_temp: acc.tmin.map(fmt0).unwrap_or_default(),
                max_temp: acc.tmax.map(fmt0).unwrap_or_default(),
                precipitation: acc.precipitation(),
                pressure: None,
                uv_index: None,
                day_text: Some(calendar.day_text),
                day: calendar.day,
                short_day: calendar.short_day,
                date: calendar.date,
                text: acc.text.take(),
                day_summary0: None,
                day_summary1: None,
                night_summary0: None,
                night_summary1: None,
                umbrella_index: None,
            });
            acc = DayAcc::default();
        }
    }

    if days.len() == FORECAST_DAYS - 1 {
        days.push(synthesize_final_day(days.last().cloned(), &acc)?);
    }
    if days.len() != FORECAST_DAYS {
        return Err(ReductionError::missing(ProviderId::OpenWeather, "forecast.list (days)"));
    }
    Ok(days)
}

/// The series stopped one day short: build the final entry. Observed
/// partial fields win; everything else carries the previous day forward,
/// with the date advanced by one.
fn synthesize_final_day(
    prev: Option<DayForecast>,
    acc: &DayAcc,
) -> Result<DayForecast, ReductionError> {
    let prev =
        prev.ok_or_else(|| ReductionError::missing(ProviderId::OpenWeather, "forecast.list"))?;

    let next_date = NaiveDate::parse_from_str(&prev.date, DATE_FMT)
        .map_err(|err| ReductionError::invalid(ProviderId::OpenWeather, "forecast.date", err))?
        + Duration::days(1);

    let (yahoo, meteo) = if acc.touched {
        // Partially observed day: keep only what was actually seen.
        (acc.yahoo.clone(), acc.meteo.clone())
    } else {
        (prev.yahoo_code.clone(), prev.meteo_code.clone())
    };

    Ok(DayForecast {
        provider_code: None,
        yahoo_code: yahoo,
        meteo_code: meteo,
        min_temp: acc.tmin.map(fmt0).unwrap_or_else(|| prev.min_temp.clone()),
        max_temp: acc.tmax.map(fmt0).unwrap_or_else(|| prev.max_temp.clone()),
        precipitation: if acc.prec.is_empty() {
            prev.precipitation.clone()
        } else {
            acc.precipitation()
        },
        pressure: None,
        uv_index: None,
        day_text: None,
        day: next_date.format("%A").to_string(),
        short_day: next_date.format("%a").to_string(),
        date: next_date.format(DATE_FMT).to_string(),
        text: acc.text.clone().or_else(|| prev.text.clone()),
        day_summary0: None,
        day_summary1: None,
        night_summary0: None,
        night_summary1: None,
        umbrella_index: None,
    })
}
