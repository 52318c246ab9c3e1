use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ConfigError, FetchError};
use crate::fetch::Fetch;
use crate::model::Query;

pub mod msn;
pub mod openmeteo;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Msn,
    OpenMeteo,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Msn => "msn",
            ProviderId::OpenMeteo => "openmeteo",
            ProviderId::OpenWeather => "openweather",
        }
    }

    /// Source label used in the reduced report.
    pub fn source_label(&self) -> &'static str {
        match self {
            ProviderId::Msn => "MSN Weather",
            ProviderId::OpenMeteo => "Open-Meteo Weather",
            ProviderId::OpenWeather => "OpenWeatherMap",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::OpenWeather)
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Msn, ProviderId::OpenMeteo, ProviderId::OpenWeather]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "msn" => Ok(ProviderId::Msn),
            "openmeteo" => Ok(ProviderId::OpenMeteo),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(ConfigError::UnknownProvider(value.to_string())),
        }
    }
}

/// A weather data source: knows its endpoint layout and how to pull the
/// raw payload for a query through the fetch collaborator.
///
/// Fetching and reduction are deliberately split: `fetch` returns the
/// verbatim payload tree (kept for raw export), and [`crate::reduce`]
/// walks it afterwards.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn fetch(&self, fetcher: &dyn Fetch, query: &Query) -> Result<Value, FetchError>;
}

/// Construct a provider for an explicit id, validating key requirements.
pub fn make_provider(
    id: ProviderId,
    api_key: Option<&str>,
) -> Result<Box<dyn WeatherProvider>, ConfigError> {
    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::Msn => Box::new(msn::MsnProvider::new()),
        ProviderId::OpenMeteo => Box::new(openmeteo::OpenMeteoProvider::new()),
        ProviderId::OpenWeather => {
            let key = api_key.ok_or(ConfigError::MissingApiKey(id))?;
            Box::new(openweather::OpenWeatherProvider::new(key.to_owned()))
        }
    };
    Ok(boxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let parsed = ProviderId::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("unknown provider"));
    }

    #[test]
    fn only_openweather_requires_a_key() {
        assert!(ProviderId::OpenWeather.requires_api_key());
        assert!(!ProviderId::Msn.requires_api_key());
        assert!(!ProviderId::OpenMeteo.requires_api_key());
    }

    #[test]
    fn make_provider_enforces_key_requirement() {
        assert!(make_provider(ProviderId::Msn, None).is_ok());
        assert!(make_provider(ProviderId::OpenMeteo, None).is_ok());

        let err = make_provider(ProviderId::OpenWeather, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(ProviderId::OpenWeather)));
        assert!(make_provider(ProviderId::OpenWeather, Some("KEY")).is_ok());
    }
}
