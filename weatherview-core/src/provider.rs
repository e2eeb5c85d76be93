use crate::{
    Config,
    error::WeatherError,
    model::{CurrentConditions, ForecastSeries, LocationQuery, Place},
    provider::{
        open_meteo::{OpenMeteoEndpoints, OpenMeteoProvider},
        openweather::{OpenWeatherEndpoints, OpenWeatherProvider},
    },
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod open_meteo;
pub mod openweather;

const USER_AGENT: &str = concat!("weatherview/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenMeteo,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenMeteo => "open-meteo",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenMeteo, ProviderId::OpenWeather]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::OpenWeather)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "open-meteo" | "openmeteo" | "open_meteo" => Ok(ProviderId::OpenMeteo),
            "openweather" | "openweathermap" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: open-meteo, openweather."
            )),
        }
    }
}

/// Turns a free-text city or a coordinate pair into a single [`Place`].
///
/// The first upstream match wins; an empty result set is
/// [`WeatherError::PlaceNotFound`].
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve(&self, query: &LocationQuery) -> Result<Place, WeatherError>;
}

/// Retrieves and normalizes weather for an already resolved place.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch_current(&self, place: &Place) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_forecast(&self, place: &Place) -> Result<ForecastSeries, WeatherError>;
}

/// One upstream service, able to both resolve and fetch.
pub trait WeatherProvider: LocationResolver + WeatherFetcher {
    fn id(&self) -> ProviderId;
}

/// Which half of the pipeline a request belongs to; picks the error variant
/// for transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Geocoding,
    Weather,
}

impl Stage {
    fn failure(self, message: String) -> WeatherError {
        match self {
            Stage::Geocoding => WeatherError::ResolverUnavailable(message),
            Stage::Weather => WeatherError::FetchFailed(message),
        }
    }
}

/// Send `request`, require a 2xx status and decode the body as `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    stage: Stage,
    what: &str,
) -> Result<T, WeatherError> {
    let res = request
        .send()
        .await
        .map_err(|e| stage.failure(format!("Failed to send request to {what}: {e}")))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| stage.failure(format!("Failed to read {what} response body: {e}")))?;

    if !status.is_success() {
        return Err(stage.failure(format!(
            "{what} request failed with status {status}: {}",
            truncate_body(&body)
        )));
    }

    serde_json::from_str(&body)
        .map_err(|e| WeatherError::MalformedPayload(format!("Failed to parse {what} JSON: {e}")))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

/// Shared HTTP client with the configured timeout.
pub fn build_http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let http = build_http_client(config.request_timeout())?;
    let days = config.forecast_days();
    let base_url = config.provider_base_url(id);

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenMeteo => {
            let endpoints = base_url.map(OpenMeteoEndpoints::with_base).unwrap_or_default();
            Box::new(OpenMeteoProvider::new(http, endpoints).with_forecast_days(days))
        }
        ProviderId::OpenWeather => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                         Hint: run `weatherview configure {id}` and enter your API key."
                )
            })?;
            let endpoints = base_url.map(OpenWeatherEndpoints::with_base).unwrap_or_default();
            Box::new(
                OpenWeatherProvider::new(http, api_key.to_owned(), endpoints)
                    .with_forecast_days(days),
            )
        }
    };

    tracing::debug!(provider = %id, forecast_days = days, "provider constructed");
    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn open_meteo_needs_no_api_key() {
        let cfg = Config::default();
        let provider = provider_from_config(ProviderId::OpenMeteo, &cfg).expect("keyless provider");
        assert_eq!(provider.id(), ProviderId::OpenMeteo);
    }

    #[test]
    fn openweather_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::OpenWeather, &cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No API key configured for provider"));
        assert!(msg.contains("weatherview configure openweather"));
    }

    #[test]
    fn default_provider_falls_back_to_open_meteo() {
        let cfg = Config::default();
        let provider = default_provider_from_config(&cfg).expect("default provider");
        assert_eq!(provider.id(), ProviderId::OpenMeteo);
    }

    #[test]
    fn default_provider_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "KEY".to_string());
        cfg.set_default_provider(ProviderId::OpenWeather);

        let provider = default_provider_from_config(&cfg).expect("configured provider");
        assert_eq!(provider.id(), ProviderId::OpenWeather);
    }

    #[test]
    fn truncate_body_is_char_safe() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
