use chrono::Utc;

use crate::{
    error::WeatherError,
    model::{LocationQuery, WeatherReport},
    provider::WeatherProvider,
};

/// Runs one complete lookup against a single provider.
#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn WeatherProvider {
        self.provider.as_ref()
    }

    /// Resolve `query`, then fetch current conditions and the forecast together.
    ///
    /// If either fetch fails the whole lookup fails; there are no partial reports.
    pub async fn lookup(&self, query: &LocationQuery) -> Result<WeatherReport, WeatherError> {
        let provider = self.provider.as_ref();
        let place = provider.resolve(query).await?;

        let (current, forecast) =
            tokio::try_join!(provider.fetch_current(&place), provider.fetch_forecast(&place))?;

        tracing::info!(
            provider = %provider.id(),
            place = %place.display_name(),
            forecast_days = forecast.len(),
            "weather report ready"
        );

        Ok(WeatherReport {
            provider: provider.id().to_string(),
            place,
            current,
            forecast,
            fetched_at: Utc::now(),
        })
    }
}
