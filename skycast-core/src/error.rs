use thiserror::Error;

use crate::provider::ProviderId;

/// Configuration / mode-selection failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown provider '{0}'. Supported providers: msn, openmeteo, openweather")]
    UnknownProvider(String),

    #[error("unknown units '{0}'. Valid units: metric, imperial")]
    UnknownUnits(String),

    #[error("API key for provider '{0}' is missing")]
    MissingApiKey(ProviderId),

    #[error("no provider selected. Call set_mode first")]
    NoMode,

    #[error("missing city name for provider '{0}'")]
    MissingCityName(ProviderId),

    #[error("missing coordinates for provider '{0}'")]
    MissingCoordinates(ProviderId),
}

/// Transport-level failures while talking to a provider endpoint.
///
/// No retries happen at this level; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON from server: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("server returned an empty document")]
    EmptyBody,
}

/// A required field could not be extracted from a provider payload and
/// gap-filling could not repair it. The whole reduction aborts; no
/// partial report is ever produced.
#[derive(Debug, Error)]
#[error("reduction failed for provider '{provider}': {field}: {cause}")]
pub struct ReductionError {
    pub provider: ProviderId,
    pub field: &'static str,
    pub cause: String,
}

impl ReductionError {
    pub fn missing(provider: ProviderId, field: &'static str) -> Self {
        Self { provider, field, cause: "field is missing".into() }
    }

    pub fn invalid(provider: ProviderId, field: &'static str, cause: impl ToString) -> Self {
        Self { provider, field, cause: cause.to_string() }
    }
}

/// Icon conversion failures. Only raised for a missing input code or an
/// unknown source vocabulary; a plain table miss is non-fatal and
/// degrades to the sentinel pair instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("input code value is missing")]
    MissingCode,

    #[error("convert source '{0}' is unknown. Valid is: msn, openmeteo, openweather")]
    UnknownSource(String),

    #[error("convert destination '{0}' is unknown. Valid is: yahoo, meteo")]
    UnknownDestination(String),
}

/// Umbrella error for session operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Reduction(#[from] ReductionError),

    /// A second `start` was issued while one was in flight. Sessions are
    /// single-flight; wait for completion (or the callback) first.
    #[error("a request is already in flight for this session")]
    Busy,

    #[error("no city '{0}' found on the server. Try another wording")]
    CityNotFound(String),
}
