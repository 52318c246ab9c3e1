//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Static condition-code tables and the icon converter
//! - Abstraction over weather providers (msn, openmeteo, openweather)
//! - The reducer that collapses raw payloads into one stable report shape
//! - The session controller with sync and callback-based completion
//! - Exporters (reduced/raw JSON, msn XML markup, diagnostic tables)
//! - Configuration & credentials handling and the geocoding collaborator
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries
//! or services.

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod geocode;
pub mod icons;
pub mod model;
pub mod provider;
pub mod reduce;
pub mod session;

pub use config::{Config, ProviderConfig};
pub use error::{ConfigError, ConversionError, Error, FetchError, ReductionError};
pub use fetch::{Fetch, HttpFetcher};
pub use icons::{IconPair, NA_PAIR};
pub use model::{
    CurrentConditions, DayForecast, FORECAST_DAYS, GeoData, Query, ReducedReport, Units,
};
pub use provider::{ProviderId, WeatherProvider};
pub use session::Session;
