//! Shared domain models: query inputs and the unified reduced report.
//!
//! All numeric report fields are pre-rendered as decimal strings with
//! zero fractional digits (`"21"`, not `21` or `21.0`). That textual
//! contract keeps the exported JSON byte-stable across platforms and
//! float formatting quirks.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn is_imperial(&self) -> bool {
        matches!(self, Units::Imperial)
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            other => Err(ConfigError::UnknownUnits(other.to_string())),
        }
    }
}

/// A geocoded location triple, as returned by the geocoding collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoData {
    /// Display name, typically "City, Region, COUNTRY".
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoData {
    pub fn new(name: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self { name: name.into(), longitude, latitude }
    }

    /// "City, Country" shortened to at most the first two comma parts,
    /// used as the report display name.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = self.name.split(',').collect();
        if parts.len() > 1 {
            format!("{}, {}", parts[0].trim(), parts[1].trim())
        } else {
            parts[0].trim().to_string()
        }
    }
}

/// One logical weather query: where, in which units, in which locale.
#[derive(Debug, Clone)]
pub struct Query {
    pub geodata: GeoData,
    pub units: Units,
    /// Language scheme like "de-de"; providers use its language part.
    pub scheme: String,
    /// Deprecated openweather numeric city id, usable instead of
    /// coordinates in that mode only.
    pub city_id: Option<String>,
}

impl Query {
    pub fn new(geodata: GeoData) -> Self {
        Self { geodata, units: Units::Metric, scheme: "de-de".to_string(), city_id: None }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_city_id(mut self, city_id: impl Into<String>) -> Self {
        self.city_id = Some(city_id.into());
        self
    }
}

/// Current conditions, flattened to primitive fields. Field names match
/// the exported JSON schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CurrentConditions {
    #[serde(rename = "observationPoint")]
    pub observation_point: String,
    #[serde(rename = "observationTime")]
    pub observation_time: String,
    pub sunrise: String,
    pub sunset: String,
    #[serde(rename = "isNight")]
    pub is_night: bool,
    #[serde(rename = "ProviderCode")]
    pub provider_code: String,
    #[serde(rename = "yahooCode")]
    pub yahoo_code: String,
    #[serde(rename = "meteoCode")]
    pub meteo_code: String,
    pub temp: String,
    #[serde(rename = "feelsLike")]
    pub feels_like: String,
    pub humidity: String,
    #[serde(rename = "windSpeed")]
    pub wind_speed: String,
    #[serde(rename = "windDir")]
    pub wind_dir: String,
    #[serde(rename = "windDirSign")]
    pub wind_dir_sign: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<String>,
    #[serde(rename = "uvIndex", skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(rename = "minTemp")]
    pub min_temp: String,
    #[serde(rename = "maxTemp")]
    pub max_temp: String,
    pub precipitation: String,
    #[serde(rename = "dayText")]
    pub day_text: String,
    pub day: String,
    #[serde(rename = "shortDay")]
    pub short_day: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raintext: Option<String>,
}

/// One forecast day. Optional fields stay absent when a provider (or a
/// synthesized gap-fill day) cannot supply them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DayForecast {
    #[serde(rename = "ProviderCode", skip_serializing_if = "Option::is_none")]
    pub provider_code: Option<String>,
    #[serde(rename = "yahooCode", skip_serializing_if = "Option::is_none")]
    pub yahoo_code: Option<String>,
    #[serde(rename = "meteoCode", skip_serializing_if = "Option::is_none")]
    pub meteo_code: Option<String>,
    #[serde(rename = "minTemp")]
    pub min_temp: String,
    #[serde(rename = "maxTemp")]
    pub max_temp: String,
    pub precipitation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<String>,
    #[serde(rename = "uvIndex", skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<String>,
    #[serde(rename = "dayText", skip_serializing_if = "Option::is_none")]
    pub day_text: Option<String>,
    pub day: String,
    #[serde(rename = "shortDay")]
    pub short_day: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "daySummary0", skip_serializing_if = "Option::is_none")]
    pub day_summary0: Option<String>,
    #[serde(rename = "daySummary1", skip_serializing_if = "Option::is_none")]
    pub day_summary1: Option<String>,
    #[serde(rename = "nightSummary0", skip_serializing_if = "Option::is_none")]
    pub night_summary0: Option<String>,
    #[serde(rename = "nightSummary1", skip_serializing_if = "Option::is_none")]
    pub night_summary1: Option<String>,
    #[serde(rename = "umbrellaIndex", skip_serializing_if = "Option::is_none")]
    pub umbrella_index: Option<String>,
}

/// The unified reduced report, independent of the source provider.
///
/// The forecast always holds exactly [`FORECAST_DAYS`] contiguous entries
/// (today first), serialized as a zero-indexed string-keyed map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedReport {
    pub source: String,
    pub name: String,
    pub longitude: String,
    pub latitude: String,
    pub tempunit: String,
    pub windunit: String,
    pub precunit: String,
    pub current: CurrentConditions,
    #[serde(serialize_with = "forecast_as_map")]
    pub forecast: Vec<DayForecast>,
}

/// Forecast horizon: today plus the next five days.
pub const FORECAST_DAYS: usize = 6;

fn forecast_as_map<S>(days: &[DayForecast], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(days.len()))?;
    for (idx, day) in days.iter().enumerate() {
        map.serialize_entry(&idx.to_string(), day)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ReducedReport {
        ReducedReport {
            source: "Open-Meteo Weather".into(),
            name: "Berlin, DE".into(),
            longitude: "13.41".into(),
            latitude: "52.52".into(),
            tempunit: "°C".into(),
            windunit: "km/h".into(),
            precunit: "%".into(),
            current: CurrentConditions::default(),
            forecast: (0..FORECAST_DAYS)
                .map(|idx| DayForecast {
                    date: format!("2026-08-{:02}", idx + 6),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn forecast_serializes_as_zero_indexed_map() {
        let json = serde_json::to_value(sample_report()).unwrap();
        let forecast = json["forecast"].as_object().expect("forecast must be an object");

        assert_eq!(forecast.len(), FORECAST_DAYS);
        for idx in 0..FORECAST_DAYS {
            assert!(forecast.contains_key(&idx.to_string()), "missing forecast index {idx}");
        }
        assert_eq!(json["forecast"]["0"]["date"], "2026-08-06");
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        let json = serde_json::to_value(sample_report()).unwrap();
        let day0 = json["forecast"]["0"].as_object().unwrap();

        assert!(!day0.contains_key("daySummary0"));
        assert!(!day0.contains_key("umbrellaIndex"));
        assert!(!json["current"].as_object().unwrap().contains_key("raintext"));
    }

    #[test]
    fn geodata_display_name_shortens_to_two_parts() {
        let geo = GeoData::new("Berlin, Berlin, Deutschland, DE", 13.41, 52.52);
        assert_eq!(geo.display_name(), "Berlin, Berlin");

        let plain = GeoData::new("Berlin", 13.41, 52.52);
        assert_eq!(plain.display_name(), "Berlin");
    }

    #[test]
    fn units_roundtrip() {
        for units in [Units::Metric, Units::Imperial] {
            assert_eq!(Units::try_from(units.as_str()).unwrap(), units);
        }
        assert!(Units::try_from("nautical").is_err());
    }
}
