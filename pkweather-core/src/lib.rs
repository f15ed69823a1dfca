//! Core library for the `pkweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client, scoped to a single country
//! - Report formatting and persistence
//! - Shared domain models (queries, observations, outcomes)
//!
//! It is used by `pkweather-cli`, but any presentation layer can drive it:
//! build a provider with [`provider_from_config`], run [`spawn_fetch`], and
//! render the [`FetchOutcome`] with a [`ReportFormatter`].

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;

pub use config::{Config, CountryConfig};
pub use error::{ErrorKind, WeatherError};
pub use model::{FetchOutcome, Measurement, Observation, WeatherQuery, WeatherResult};
pub use provider::{
    FetchHandle, WeatherProvider, openweather::OpenWeatherProvider, provider_from_config,
    spawn_fetch,
};
pub use report::{Report, ReportFormatter};
