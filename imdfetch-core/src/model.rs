use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entry in the provider's city directory.
///
/// Created in bulk when the city list page is parsed and immutable afterwards;
/// a cache refresh replaces the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityInfo {
    /// Numeric id, unique within a directory snapshot.
    pub city_id: u32,
    /// Name exactly as published.
    pub display_name: String,
    /// Normalized form of `display_name`, used for matching.
    pub clean_name: String,
    /// Raw select-option token as published by the provider.
    pub full_value: String,
}

impl CityInfo {
    pub fn new(
        city_id: u32,
        display_name: impl Into<String>,
        full_value: impl Into<String>,
    ) -> Self {
        let display_name = display_name.into();
        let clean_name = normalize_name(&display_name);
        Self {
            city_id,
            display_name,
            clean_name,
            full_value: full_value.into(),
        }
    }
}

/// Lowercases, turns punctuation into spaces, and collapses whitespace.
/// `clean_name` is always exactly `normalize_name(display_name)`.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// A single labeled observation value, e.g. "Maximum Temperature (°C)" / "34".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherParameter {
    pub parameter: String,
    pub value: String,
}

/// Current ("past 24 hours") observation block for one city.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherData {
    pub city: String,
    pub city_id: Option<u32>,
    pub date: NaiveDate,
    /// Source order; parameter names are not guaranteed unique.
    pub parameters: Vec<WeatherParameter>,
}

impl WeatherData {
    /// Value of the first parameter whose name contains `name`,
    /// case-insensitively.
    pub fn get_parameter(&self, name: &str) -> Option<&str> {
        let needle = name.to_lowercase();
        self.parameters
            .iter()
            .find(|p| p.parameter.to_lowercase().contains(&needle))
            .map(|p| p.value.as_str())
    }
}

/// One day of the 7-day forecast table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    /// Absent when the provider publishes a non-numeric placeholder.
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    /// Free-text description.
    pub forecast: String,
    pub warnings: Option<String>,
    /// Relative humidity at 08:30 IST, as published.
    pub rh_0830: Option<String>,
    /// Relative humidity at 17:30 IST, as published.
    pub rh_1730: Option<String>,
}

/// Forecast block for one city: generation date plus up to seven days,
/// chronological, no duplicate dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastData {
    pub city: String,
    pub city_id: Option<u32>,
    /// Date the provider generated the forecast.
    pub forecast_date: NaiveDate,
    pub days: Vec<DayForecast>,
}

impl ForecastData {
    pub fn get_day(&self, date: NaiveDate) -> Option<&DayForecast> {
        self.days.iter().find(|d| d.date == date)
    }
}

/// How a caller names a city: numeric provider id or free-text name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityIdentifier {
    ById(u32),
    ByName(String),
}

impl From<u32> for CityIdentifier {
    fn from(id: u32) -> Self {
        CityIdentifier::ById(id)
    }
}

impl From<&str> for CityIdentifier {
    /// All-digit strings are treated as ids, anything else as a name.
    fn from(value: &str) -> Self {
        match value.trim().parse::<u32>() {
            Ok(id) => CityIdentifier::ById(id),
            Err(_) => CityIdentifier::ByName(value.to_string()),
        }
    }
}

impl From<String> for CityIdentifier {
    fn from(value: String) -> Self {
        CityIdentifier::from(value.as_str())
    }
}

impl fmt::Display for CityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CityIdentifier::ById(id) => write!(f, "{id}"),
            CityIdentifier::ByName(name) => f.write_str(name),
        }
    }
}
