use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    config::{Config, CountryConfig},
    error::WeatherError,
    model::{FetchOutcome, Observation, WeatherQuery},
};

use super::WeatherProvider;

/// Client for the OpenWeather "current weather" endpoint, scoped to one country.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    country: CountryConfig,
    timeout: Duration,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        country: CountryConfig,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        if timeout.is_zero() {
            return Err(WeatherError::Client(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url,
            country,
            timeout,
            http,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key()?.to_owned();
        let provider = Self::new(
            api_key,
            config.base_url.clone(),
            config.country.clone(),
            config.timeout(),
        )?;
        Ok(provider)
    }

    pub fn country(&self) -> &CountryConfig {
        &self.country
    }

    #[instrument(skip(self, query), fields(city = %query.city()))]
    async fn fetch_current(&self, query: &WeatherQuery) -> Result<Observation, WeatherError> {
        let location = query.location(&self.country.code);

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.transport_error(e))?;
        debug!(%status, bytes = body.len(), "OpenWeather responded");

        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| WeatherError::parse("<body>", e.to_string()))?;

        Observation::for_country(payload, &self.country)
    }

    /// The request URL carries the API key, so it is stripped from the message.
    fn transport_error(&self, err: reqwest::Error) -> WeatherError {
        if err.is_timeout() {
            return WeatherError::Transport(format!(
                "Request timed out after {} seconds",
                self.timeout.as_secs_f64()
            ));
        }

        let err = err.without_url();
        let mut msg = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            msg.push_str(": ");
            msg.push_str(&cause.to_string());
            source = cause.source();
        }
        WeatherError::Transport(msg)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, query: &WeatherQuery) -> FetchOutcome {
        let result = self.fetch_current(query).await;
        if let Err(err) = &result {
            debug!(city = %query.city(), kind = ?err.kind(), error = %err, "weather fetch failed");
        }
        result.into()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
