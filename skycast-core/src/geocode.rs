//! City geocoding collaborator.
//!
//! Resolves free-text city names into name/longitude/latitude triples.
//! msn and openmeteo modes share the Open-Meteo geocoding endpoint; the
//! openweather mode uses OWM's own geocoder (plus its deprecated numeric
//! city-id and reverse lookups). The weather core consumes the resulting
//! [`GeoData`] as an opaque triple.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Error};
use crate::fetch::Fetch;
use crate::model::GeoData;
use crate::provider::ProviderId;

const OPEN_METEO_GEO_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const OWM_GEO_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
const OWM_REVERSE_URL: &str = "http://api.openweathermap.org/geo/1.0/reverse";
const OWM_FORECAST_URL: &str = "http://api.openweathermap.org/data/2.5/forecast";

/// At most this many matches are offered for disambiguation.
const MAX_MATCHES: usize = 9;

/// Split an optional trailing country off a city spelling. Any of the
/// common separators works: "Berlin, DE", "Berlin;DE", "Berlin|DE".
pub fn separate_city_country(cityname: &str) -> (String, Option<String>) {
    for separator in [',', ';', '&', '|', '!'] {
        let items: Vec<&str> = cityname.split(separator).collect();
        if items.len() > 1 {
            let city = items[..items.len() - 1].concat().trim().to_string();
            let country = items[items.len() - 1].trim().to_uppercase();
            return (city, Some(country));
        }
    }
    (cityname.to_string(), None)
}

/// Look up candidate cities for the active mode.
pub async fn city_lookup(
    fetcher: &dyn Fetch,
    mode: ProviderId,
    api_key: Option<&str>,
    cityname: &str,
    scheme: &str,
) -> Result<Vec<GeoData>, Error> {
    if cityname.is_empty() {
        return Err(ConfigError::MissingCityName(mode).into());
    }
    match mode {
        ProviderId::Msn | ProviderId::OpenMeteo => {
            open_meteo_lookup(fetcher, cityname, scheme).await
        }
        ProviderId::OpenWeather => {
            let api_key =
                api_key.ok_or(ConfigError::MissingApiKey(ProviderId::OpenWeather))?;
            owm_lookup(fetcher, api_key, cityname, scheme).await
        }
    }
}

// ---------------------------------------------------------------------------
// Open-Meteo geocoding.

#[derive(Debug, Deserialize)]
struct OmGeoResponse {
    #[serde(default)]
    results: Vec<OmGeoHit>,
}

#[derive(Debug, Deserialize)]
struct OmGeoHit {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    admin2: Option<String>,
    #[serde(default)]
    admin3: Option<String>,
    longitude: f64,
    latitude: f64,
}

async fn open_meteo_lookup(
    fetcher: &dyn Fetch,
    cityname: &str,
    scheme: &str,
) -> Result<Vec<GeoData>, Error> {
    let (city, country) = separate_city_country(cityname);
    let lang = scheme.get(..2).unwrap_or("en");

    // Multi-word spellings often miss; retry with the first word alone.
    let first_word = city.split(' ').next().unwrap_or(&city).to_string();
    let mut response: Option<OmGeoResponse> = None;
    for candidate in [&city, &first_word] {
        let suffix = country.as_ref().map(|c| format!(",{c}")).unwrap_or_default();
        let url =
            format!("{OPEN_METEO_GEO_URL}?name={candidate}{suffix}&language={lang}&count=10");
        match fetcher.get_json(&url).await {
            Ok(value) => {
                let parsed: OmGeoResponse =
                    Deserialize::deserialize(&value).unwrap_or(OmGeoResponse { results: vec![] });
                if !parsed.results.is_empty() {
                    response = Some(parsed);
                    break;
                }
            }
            Err(err) => debug!(%err, candidate, "geocoding attempt failed"),
        }
    }

    let response = response.ok_or_else(|| Error::CityNotFound(cityname.to_string()))?;
    Ok(response
        .results
        .into_iter()
        .take(MAX_MATCHES)
        .map(|hit| {
            let mut name = hit.name.unwrap_or_default();
            for admin in [&hit.admin1, &hit.admin2, &hit.admin3] {
                if let Some(admin) = admin {
                    name.push_str(&format!(", {admin}"));
                }
            }
            if let Some(country) = &hit.country {
                name.push_str(&format!(", {}", country.to_uppercase()));
            }
            GeoData::new(name, hit.longitude, hit.latitude)
        })
        .collect())
}

// ---------------------------------------------------------------------------
// OWM geocoding.

#[derive(Debug, Deserialize)]
struct OwmGeoHit {
    name: String,
    #[serde(default)]
    local_names: Option<HashMap<String, String>>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
    lon: f64,
    lat: f64,
}

/// OWM spells a few languages differently than the scheme does.
fn owm_lang(scheme: &str) -> &str {
    match scheme.get(..2).unwrap_or("en") {
        "br" => "pt",
        "se" => "sv",
        "es" => "sp",
        "cn" => "zh",
        other => other,
    }
}

fn owm_hit_name(hit: &OwmGeoHit, lang: &str) -> String {
    let mut name = hit
        .local_names
        .as_ref()
        .and_then(|names| names.get(lang))
        .cloned()
        .unwrap_or_else(|| hit.name.clone());
    if let Some(state) = &hit.state {
        name.push_str(&format!(", {state}"));
    }
    if let Some(country) = &hit.country {
        name.push_str(&format!(", {}", country.to_uppercase()));
    }
    name
}

async fn owm_lookup(
    fetcher: &dyn Fetch,
    api_key: &str,
    cityname: &str,
    scheme: &str,
) -> Result<Vec<GeoData>, Error> {
    let (city, country) = separate_city_country(cityname);
    let lang = owm_lang(scheme);

    let first_word = city.split(' ').next().unwrap_or(&city).to_string();
    let mut hits: Vec<OwmGeoHit> = Vec::new();
    for candidate in [&city, &first_word] {
        let suffix = country.as_ref().map(|c| format!(",{c}")).unwrap_or_default();
        let url = format!(
            "{OWM_GEO_URL}?q={candidate}{suffix}&lang={lang}&limit=15&appid={api_key}"
        );
        match fetcher.get_json(&url).await {
            Ok(value) => {
                hits = Deserialize::deserialize(&value).unwrap_or_default();
                if !hits.is_empty() {
                    break;
                }
            }
            Err(err) => debug!(%err, candidate, "geocoding attempt failed"),
        }
    }

    if hits.is_empty() {
        return Err(Error::CityNotFound(cityname.to_string()));
    }
    Ok(hits
        .into_iter()
        .take(MAX_MATCHES)
        .map(|hit| {
            let name = owm_hit_name(&hit, lang);
            GeoData::new(name, hit.lon, hit.lat)
        })
        .collect())
}

/// Resolve a deprecated OWM numeric city id into a geocoded triple.
pub async fn city_by_id(
    fetcher: &dyn Fetch,
    api_key: &str,
    city_id: &str,
) -> Result<GeoData, Error> {
    let url = format!("{OWM_FORECAST_URL}?id={city_id}&cnt=1&appid={api_key}");
    let value = fetcher.get_json(&url).await?;
    parse_city_block(&value).ok_or_else(|| Error::CityNotFound(city_id.to_string()))
}

fn parse_city_block(value: &Value) -> Option<GeoData> {
    let city = value.get("city")?;
    let name = city.get("name")?.as_str()?;
    let coord = city.get("coord")?;
    Some(GeoData::new(name, coord.get("lon")?.as_f64()?, coord.get("lat")?.as_f64()?))
}

/// Reverse lookup: "lon,lat" string into candidate cities (OWM only).
pub async fn reverse_lookup(
    fetcher: &dyn Fetch,
    api_key: &str,
    geocode: &str,
    scheme: &str,
) -> Result<Vec<GeoData>, Error> {
    let mut parts = geocode.split(',');
    let (lon, lat) = match (parts.next(), parts.next()) {
        (Some(lon), Some(lat)) => (lon.trim().to_string(), lat.trim().to_string()),
        _ => return Err(ConfigError::MissingCoordinates(ProviderId::OpenWeather).into()),
    };

    let url = format!("{OWM_REVERSE_URL}?lon={lon}&lat={lat}&limit=15&appid={api_key}");
    let value = fetcher.get_json(&url).await?;
    let hits: Vec<OwmGeoHit> = Deserialize::deserialize(&value).unwrap_or_default();
    if hits.is_empty() {
        return Err(Error::CityNotFound(geocode.to_string()));
    }

    let lang = owm_lang(scheme);
    Ok(hits
        .into_iter()
        .map(|hit| {
            let name = owm_hit_name(&hit, lang);
            GeoData::new(name, hit.lon, hit.lat)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;
    use serde_json::json;

    #[test]
    fn city_country_separation() {
        assert_eq!(separate_city_country("Berlin"), ("Berlin".into(), None));
        assert_eq!(separate_city_country("Berlin, de"), ("Berlin".into(), Some("DE".into())));
        assert_eq!(separate_city_country("Berlin;de"), ("Berlin".into(), Some("DE".into())));
        assert_eq!(separate_city_country("Frankfurt | de"), ("Frankfurt".into(), Some("DE".into())));
    }

    #[test]
    fn owm_language_specials() {
        assert_eq!(owm_lang("br-br"), "pt");
        assert_eq!(owm_lang("se-se"), "sv");
        assert_eq!(owm_lang("es-es"), "sp");
        assert_eq!(owm_lang("cn-cn"), "zh");
        assert_eq!(owm_lang("de-de"), "de");
    }

    #[tokio::test]
    async fn open_meteo_lookup_composes_display_names() {
        let stub = StubFetcher::new().with(
            "geocoding-api.open-meteo.com",
            json!({
                "results": [{
                    "name": "Berlin",
                    "admin1": "Berlin",
                    "country": "Deutschland",
                    "longitude": 13.41,
                    "latitude": 52.52
                }]
            }),
        );

        let cities =
            city_lookup(&stub, ProviderId::OpenMeteo, None, "Berlin", "de-de").await.unwrap();
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].name, "Berlin, Berlin, DEUTSCHLAND");
        assert_eq!(cities[0].longitude, 13.41);
    }

    #[tokio::test]
    async fn open_meteo_lookup_caps_the_match_list() {
        let hits: Vec<Value> = (0..12)
            .map(|i| json!({ "name": format!("Springfield {i}"), "longitude": 1.0, "latitude": 2.0 }))
            .collect();
        let stub = StubFetcher::new()
            .with("geocoding-api.open-meteo.com", json!({ "results": hits }));

        let cities =
            city_lookup(&stub, ProviderId::Msn, None, "Springfield", "en-us").await.unwrap();
        assert_eq!(cities.len(), MAX_MATCHES);
    }

    #[tokio::test]
    async fn open_meteo_lookup_retries_with_the_first_word() {
        // Only the single-word fallback query is stubbed.
        let stub = StubFetcher::new().with(
            "name=Frankfurt&",
            json!({
                "results": [{ "name": "Frankfurt", "longitude": 8.68, "latitude": 50.11 }]
            }),
        );

        let cities =
            city_lookup(&stub, ProviderId::OpenMeteo, None, "Frankfurt am Main", "de-de")
                .await
                .unwrap();
        assert_eq!(cities[0].name, "Frankfurt");
    }

    #[tokio::test]
    async fn unknown_city_is_reported() {
        let stub = StubFetcher::new()
            .with("geocoding-api.open-meteo.com", json!({ "results": [] }));

        let err = city_lookup(&stub, ProviderId::OpenMeteo, None, "Atlantis", "en-us")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CityNotFound(_)));
    }

    #[tokio::test]
    async fn owm_lookup_requires_key_and_prefers_local_names() {
        let err = city_lookup(&StubFetcher::new(), ProviderId::OpenWeather, None, "Kyiv", "ua-ua")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingApiKey(_))));

        let stub = StubFetcher::new().with(
            "geo/1.0/direct",
            json!([{
                "name": "Kyiv",
                "local_names": { "ua": "Київ" },
                "country": "ua",
                "lon": 30.52,
                "lat": 50.45
            }]),
        );
        let cities = city_lookup(&stub, ProviderId::OpenWeather, Some("KEY"), "Kyiv", "ua-ua")
            .await
            .unwrap();
        assert_eq!(cities[0].name, "Київ, UA");
    }

    #[tokio::test]
    async fn city_by_id_reads_the_city_block() {
        let stub = StubFetcher::new().with(
            "data/2.5/forecast",
            json!({
                "city": { "name": "Berlin", "coord": { "lon": 13.41, "lat": 52.52 } },
                "list": []
            }),
        );

        let city = city_by_id(&stub, "KEY", "2950159").await.unwrap();
        assert_eq!(city.name, "Berlin");
        assert_eq!(city.latitude, 52.52);
    }

    #[tokio::test]
    async fn reverse_lookup_needs_both_coordinates() {
        let err = reverse_lookup(&StubFetcher::new(), "KEY", "13.41", "de-de").await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingCoordinates(_))));
    }
}
