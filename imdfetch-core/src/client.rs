//! Client orchestration: city resolution, page fetches, parsing, retries.

use crate::directory::CityDirectory;
use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::model::{CityIdentifier, CityInfo, ForecastData, WeatherData};
use crate::parse;

/// Constructor-level knobs. There is no configuration file; this is the
/// whole configuration surface.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoints: Endpoints,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Additional attempts after the first network failure.
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries.
    pub backoff_base_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            timeout_secs: 10,
            max_retries: 3,
            backoff_base_ms: 1_000,
        }
    }
}

/// Client for the IMD city weather pages.
///
/// Owns the city directory cache; one instance is meant to be driven from a
/// single task, and every call blocks until network and parsing complete or
/// the retry budget is spent.
#[derive(Debug)]
pub struct WeatherClient {
    fetcher: Fetcher,
    endpoints: Endpoints,
    directory: CityDirectory,
}

impl WeatherClient {
    pub fn new() -> Result<Self> {
        Self::with_options(ClientOptions::default())
    }

    pub fn with_options(options: ClientOptions) -> Result<Self> {
        let fetcher = Fetcher::new(
            options.timeout_secs,
            options.max_retries,
            options.backoff_base_ms,
        )?;
        Ok(Self {
            fetcher,
            endpoints: options.endpoints,
            directory: CityDirectory::default(),
        })
    }

    /// Cached city list; hits the network only when the cache is empty or
    /// `refresh_cache` is set.
    pub async fn get_cities(&mut self, refresh_cache: bool) -> Result<&[CityInfo]> {
        self.directory
            .load(&self.fetcher, &self.endpoints, refresh_cache)
            .await
    }

    /// Name search over the (lazily loaded) directory.
    pub async fn find_city(&mut self, query: &str, exact_match: bool) -> Result<Vec<CityInfo>> {
        self.get_cities(false).await?;
        Ok(self
            .directory
            .find(query, exact_match)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn get_city_by_id(&mut self, city_id: u32) -> Result<Option<CityInfo>> {
        self.get_cities(false).await?;
        Ok(self.directory.get_by_id(city_id).cloned())
    }

    /// Resolves a name or id to a single unambiguous directory entry.
    ///
    /// Names try an exact match first; if that does not pin down exactly one
    /// city, a partial match with exactly one candidate wins. Zero matches
    /// and ambiguity both fail, and neither is retried: the same identifier
    /// cannot resolve differently on a second attempt.
    pub async fn resolve(&mut self, identifier: impl Into<CityIdentifier>) -> Result<CityInfo> {
        let identifier = identifier.into();
        self.get_cities(false).await?;
        match &identifier {
            CityIdentifier::ById(id) => {
                self.directory
                    .get_by_id(*id)
                    .cloned()
                    .ok_or_else(|| Error::CityNotFound {
                        identifier: identifier.to_string(),
                        reason: "no city with this id in the directory".to_string(),
                    })
            }
            CityIdentifier::ByName(name) => {
                if let [only] = self.directory.find(name, true).as_slice() {
                    return Ok((*only).clone());
                }
                let partial = self.directory.find(name, false);
                match partial.as_slice() {
                    [only] => Ok((*only).clone()),
                    [] => Err(Error::CityNotFound {
                        identifier: name.clone(),
                        reason: "no matching city".to_string(),
                    }),
                    many => {
                        let candidates: Vec<&str> = many
                            .iter()
                            .take(5)
                            .map(|city| city.display_name.as_str())
                            .collect();
                        Err(Error::CityNotFound {
                            identifier: name.clone(),
                            reason: format!(
                                "ambiguous, {} matches (e.g. {})",
                                many.len(),
                                candidates.join(", ")
                            ),
                        })
                    }
                }
            }
        }
    }

    /// Current observation block for a city.
    pub async fn get_current_weather(
        &mut self,
        identifier: impl Into<CityIdentifier>,
    ) -> Result<WeatherData> {
        let city = self.resolve(identifier).await?;
        let body = self.fetch_weather_page(&city).await?;
        let mut weather = parse::parse_current_weather(&body, &city.display_name)?;
        weather.city_id = Some(city.city_id);
        Ok(weather)
    }

    /// 7-day forecast block for a city.
    pub async fn get_forecast(
        &mut self,
        identifier: impl Into<CityIdentifier>,
    ) -> Result<ForecastData> {
        let city = self.resolve(identifier).await?;
        let body = self.fetch_weather_page(&city).await?;
        let mut forecast = parse::parse_forecast(&body, &city.display_name)?;
        forecast.city_id = Some(city.city_id);
        Ok(forecast)
    }

    /// Both blocks for one city, from a single page snapshot.
    ///
    /// There is no partial success: if either block fails to parse, the
    /// whole call fails.
    pub async fn get_complete_weather_data(
        &mut self,
        identifier: impl Into<CityIdentifier>,
    ) -> Result<(WeatherData, ForecastData)> {
        let city = self.resolve(identifier).await?;
        let body = self.fetch_weather_page(&city).await?;
        let mut weather = parse::parse_current_weather(&body, &city.display_name)?;
        weather.city_id = Some(city.city_id);
        let mut forecast = parse::parse_forecast(&body, &city.display_name)?;
        forecast.city_id = Some(city.city_id);
        Ok((weather, forecast))
    }

    async fn fetch_weather_page(&self, city: &CityInfo) -> Result<String> {
        let url = self.endpoints.weather_url(city.city_id);
        tracing::debug!(city = %city.display_name, url, "fetching weather page");
        self.fetcher.get(&url).await
    }
}
