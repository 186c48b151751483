use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use crate::{
    codec,
    model::{CurrentConditions, Location},
};

use super::{FetchError, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code";

/// Open-Meteo `forecast?current=` client.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    http: Client,
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, Client::new())
    }

    pub fn with_http(base_url: impl Into<String>, http: Client) -> Self {
        Self { base_url: base_url.into(), http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, location: &Location) -> RequestBuilder {
        self.http.get(&self.base_url).query(&[
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
        ])
    }
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch_current(
        &self,
        location: &Location,
        timeout: Duration,
    ) -> Result<CurrentConditions, FetchError> {
        // The response is consumed by `text()`; the connection goes back to the
        // pool or is dropped on every return below.
        let res = self.request(location).timeout(timeout).send().await.map_err(classify)?;

        let status = res.status();
        let body = res.text().await.map_err(classify)?;

        if !status.is_success() {
            debug!(
                "Open-Meteo request for {} failed with status {}: {}",
                location.name,
                status,
                truncate_body(&body)
            );
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(codec::decode(&body)?)
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(err.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
