//! Fixed provider endpoints, substitutable for tests.

const CITY_LIST_URL: &str = "https://internal.imd.gov.in/pages/city_weather_main_mausam.php";
const WEATHER_URL_PREFIX: &str = "https://city.imd.gov.in/citywx/city_weather.php?id=";
const WEATHER_TEST_URL_PREFIX: &str =
    "https://city.imd.gov.in/citywx/city_weather_test_try_warnings.php?id=";

/// Where the provider pages live.
///
/// Current observations and the 7-day forecast are published on the same
/// city weather page; one fetched body serves both parse functions.
#[derive(Debug, Clone)]
pub struct Endpoints {
    city_list_url: String,
    weather_url_prefix: String,
}

impl Endpoints {
    /// Production IMD pages.
    pub fn production() -> Self {
        Self {
            city_list_url: CITY_LIST_URL.to_string(),
            weather_url_prefix: WEATHER_URL_PREFIX.to_string(),
        }
    }

    /// The provider's alternate test page for city weather.
    pub fn test_endpoint() -> Self {
        Self {
            weather_url_prefix: WEATHER_TEST_URL_PREFIX.to_string(),
            ..Self::production()
        }
    }

    /// Point both pages at arbitrary URLs, e.g. a local mock server.
    pub fn custom(
        city_list_url: impl Into<String>,
        weather_url_prefix: impl Into<String>,
    ) -> Self {
        Self {
            city_list_url: city_list_url.into(),
            weather_url_prefix: weather_url_prefix.into(),
        }
    }

    pub(crate) fn city_list_url(&self) -> &str {
        &self.city_list_url
    }

    pub(crate) fn weather_url(&self, city_id: u32) -> String {
        format!("{}{city_id}", self.weather_url_prefix)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_url_appends_the_city_id() {
        let endpoints = Endpoints::custom("http://localhost/cities", "http://localhost/wx?id=");
        assert_eq!(endpoints.weather_url(43279), "http://localhost/wx?id=43279");
    }

    #[test]
    fn test_endpoint_keeps_the_city_list_url() {
        let endpoints = Endpoints::test_endpoint();
        assert_eq!(endpoints.city_list_url(), CITY_LIST_URL);
        assert!(endpoints.weather_url(1).starts_with(WEATHER_TEST_URL_PREFIX));
    }
}
