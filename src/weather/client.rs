use std::time::Duration;

use anyhow::{Context, Result};

use super::error::FetchError;
use super::types::{ApiParam, Location, WeatherResponse};
use super::WeatherProvider;
use crate::sky::Weather;

pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";

const PROXY_VARS: [&str; 4] = ["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(uri) = system_proxy_uri(|name| std::env::var(name).ok()) {
            let proxy = reqwest::Proxy::all(&uri).context("invalid proxy url in environment")?;
            log::info!("routing weather requests through the system proxy");
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            http: builder.build().context("failed to build http client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(
        &self,
        path: &str,
        query: &[(&str, String)],
        not_found: &str,
    ) -> Result<String, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        check_status(response.status().as_u16(), not_found)?;

        response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}

impl WeatherProvider for OpenWeatherClient {
    async fn get_location(&self, param: &ApiParam) -> Result<Location, FetchError> {
        let query = [
            ("zip", format!("{},{}", param.zip_code, param.country_code)),
            ("appid", param.api_key.clone()),
        ];
        let body = self
            .fetch("/geo/1.0/zip", &query, "ZIP code or country code is unknown.")
            .await?;
        let location = parse_location(&body)?;
        log::debug!("fetched location: lat {}, lon {}", location.lat, location.lon);
        Ok(location)
    }

    async fn get_weather(
        &self,
        location: &Location,
        api_key: &str,
        day_origin: i64,
    ) -> Result<Weather, FetchError> {
        let query = [
            ("lat", location.lat.to_string()),
            ("lon", location.lon.to_string()),
            ("appid", api_key.to_string()),
        ];
        let body = self
            .fetch("/data/2.5/weather", &query, "location is invalid.")
            .await?;
        parse_weather(&body, day_origin)
    }
}

fn check_status(status: u16, not_found: &str) -> Result<(), FetchError> {
    match status {
        200 => Ok(()),
        401 => Err(FetchError::ApiKey("Invalid API key.".to_string())),
        404 => Err(FetchError::Param(not_found.to_string())),
        other => Err(FetchError::UnknownResponse(format!("status code: {other}"))),
    }
}

fn parse_location(body: &str) -> Result<Location, FetchError> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::UnknownResponse(format!("location API parse error: {e}")))
}

/// Converts the unix sunrise/sunset in `body` to offsets from `day_origin`.
fn parse_weather(body: &str, day_origin: i64) -> Result<Weather, FetchError> {
    let response: WeatherResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::UnknownResponse(format!("weather API parse error: {e}")))?;
    let origin = day_origin as f64;
    Ok(Weather {
        sunrise: response.sys.sunrise - origin,
        sunset: response.sys.sunset - origin,
        cloud: f64::from(response.clouds.all),
    })
}

fn system_proxy_uri(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    PROXY_VARS
        .iter()
        .filter_map(|name| lookup(*name))
        .find(|value| !value.trim().is_empty())
}
