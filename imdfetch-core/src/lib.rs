//! Core library for the `imdfetch` CLI.
//!
//! This crate defines:
//! - Typed models for the IMD city directory, current observations, and
//!   7-day forecasts
//! - A pure HTML parsing layer, testable against fixed page fixtures
//! - A client that resolves city identifiers, caches the city directory, and
//!   retries transient network failures
//!
//! It is used by `imdfetch-cli`, but can also be reused by other binaries or
//! services.

pub mod client;
pub mod directory;
pub mod endpoints;
pub mod error;
mod fetch;
pub mod model;
pub mod parse;

pub use client::{ClientOptions, WeatherClient};
pub use directory::CityDirectory;
pub use endpoints::Endpoints;
pub use error::{Error, NetworkCause, Result};
pub use model::{
    CityIdentifier, CityInfo, DayForecast, ForecastData, WeatherData, WeatherParameter,
};
