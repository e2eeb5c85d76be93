use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    condition::ConditionCategory,
    error::WeatherError,
    model::{CurrentConditions, ForecastSeries, LocationQuery, Place},
    normalize::{self, CurrentPayload, ForecastPayload, ForecastSlot, MISSING_CODE},
    provider::{LocationResolver, ProviderId, Stage, WeatherFetcher, WeatherProvider, get_json},
};

/// The free 5 day / 3 hour forecast cannot go further.
const MAX_FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone)]
pub struct OpenWeatherEndpoints {
    pub geocoding: String,
    pub reverse: String,
    pub current: String,
    pub forecast: String,
}

impl Default for OpenWeatherEndpoints {
    fn default() -> Self {
        Self::with_base("https://api.openweathermap.org")
    }
}

impl OpenWeatherEndpoints {
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            geocoding: format!("{base}/geo/1.0/direct"),
            reverse: format!("{base}/geo/1.0/reverse"),
            current: format!("{base}/data/2.5/weather"),
            forecast: format!("{base}/data/2.5/forecast"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    endpoints: OpenWeatherEndpoints,
    forecast_days: usize,
}

impl OpenWeatherProvider {
    pub fn new(http: Client, api_key: String, endpoints: OpenWeatherEndpoints) -> Self {
        Self { api_key, http, endpoints, forecast_days: MAX_FORECAST_DAYS }
    }

    pub fn with_forecast_days(mut self, days: usize) -> Self {
        self.forecast_days = days.clamp(1, MAX_FORECAST_DAYS);
        self
    }

    async fn geocode(
        &self,
        url: &str,
        params: &[(&str, String)],
        label: String,
    ) -> Result<Place, WeatherError> {
        let request = self
            .http
            .get(url)
            .query(params)
            .query(&[("limit", "1"), ("appid", self.api_key.as_str())]);

        let parsed: Vec<OwGeoResult> =
            get_json(request, Stage::Geocoding, "OpenWeather geocoding").await?;

        let first = parsed
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::PlaceNotFound(label.clone()))?;

        let (Some(latitude), Some(longitude)) = (first.lat, first.lon) else {
            return Err(WeatherError::MalformedPayload(
                "OpenWeather geocoding result has no coordinates".into(),
            ));
        };

        Ok(Place {
            name: first.name.unwrap_or(label),
            country_code: first.country.unwrap_or_default().to_uppercase(),
            latitude,
            longitude,
        })
    }

    fn place_params(&self, place: &Place) -> [(&'static str, String); 4] {
        [
            ("lat", place.latitude.to_string()),
            ("lon", place.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ]
    }
}

#[async_trait]
impl LocationResolver for OpenWeatherProvider {
    async fn resolve(&self, query: &LocationQuery) -> Result<Place, WeatherError> {
        let place = match query {
            LocationQuery::City(name) => {
                tracing::debug!(
                    city = %name,
                    url = %self.endpoints.geocoding,
                    "openweather geocoding"
                );
                self.geocode(&self.endpoints.geocoding, &[("q", name.clone())], name.clone())
                    .await?
            }
            LocationQuery::Coordinates { latitude, longitude } => {
                tracing::debug!(
                    latitude,
                    longitude,
                    url = %self.endpoints.reverse,
                    "openweather reverse"
                );
                let params = [("lat", latitude.to_string()), ("lon", longitude.to_string())];
                let mut place =
                    self.geocode(&self.endpoints.reverse, &params, query.label()).await?;
                // keep the caller's exact position rather than the matched city centre
                place.latitude = *latitude;
                place.longitude = *longitude;
                place
            }
        };

        tracing::info!(place = %place.display_name(), "resolved location");
        Ok(place)
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherProvider {
    async fn fetch_current(&self, place: &Place) -> Result<CurrentConditions, WeatherError> {
        let request = self.http.get(&self.endpoints.current).query(&self.place_params(place));

        let parsed: OwCurrentResponse =
            get_json(request, Stage::Weather, "OpenWeather (current weather)").await?;
        Ok(parsed.to_current())
    }

    async fn fetch_forecast(&self, place: &Place) -> Result<ForecastSeries, WeatherError> {
        let request = self.http.get(&self.endpoints.forecast).query(&self.place_params(place));

        let parsed: OwForecastResponse =
            get_json(request, Stage::Weather, "OpenWeather (5-day forecast)").await?;
        Ok(parsed.to_forecast(self.forecast_days))
    }
}

impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwGeoResult {
    pub name: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwMain {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwWeather {
    pub id: Option<i32>,
    pub description: Option<String>,
    /// e.g. `10n`; only the day/night suffix is used.
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwWind {
    pub speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwCurrentResponse {
    pub dt: Option<i64>,
    pub main: Option<OwMain>,
    pub weather: Vec<OwWeather>,
    pub wind: Option<OwWind>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwCity {
    /// Shift from UTC in seconds.
    pub timezone: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwForecastEntry {
    pub dt: Option<i64>,
    pub main: Option<OwMain>,
    pub weather: Vec<OwWeather>,
    /// Probability of precipitation, 0..=1.
    pub pop: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OwForecastResponse {
    pub city: Option<OwCity>,
    pub list: Vec<OwForecastEntry>,
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

impl CurrentPayload for OwCurrentResponse {
    fn to_current(&self) -> CurrentConditions {
        let empty_main = OwMain::default();
        let main = self.main.as_ref().unwrap_or(&empty_main);
        let weather = self.weather.first();

        let code = weather.and_then(|w| w.id).unwrap_or(MISSING_CODE);
        let category = ConditionCategory::from_openweather_code(code);
        let daytime = !weather
            .and_then(|w| w.icon.as_deref())
            .is_some_and(|icon| icon.ends_with('n'));

        CurrentConditions {
            temperature_c: normalize::temperature(main.temp),
            feels_like_c: normalize::temperature(main.feels_like),
            humidity_pct: normalize::percent(main.humidity),
            pressure_hpa: normalize::measurement(main.pressure),
            wind_speed_ms: normalize::measurement(self.wind.as_ref().and_then(|w| w.speed)),
            condition_code: code,
            category,
            description: weather
                .and_then(|w| w.description.clone())
                .unwrap_or_else(|| category.as_str().to_string()),
            icon: category.icon(daytime),
            precipitation_probability_pct: 0,
            observed_at: self.dt.and_then(unix_to_utc),
        }
    }
}

impl ForecastPayload for OwForecastResponse {
    fn to_forecast(&self, max_days: usize) -> ForecastSeries {
        let offset = self.city.as_ref().and_then(|c| c.timezone).unwrap_or(0);

        let slots: Vec<ForecastSlot> = self
            .list
            .iter()
            .filter_map(|entry| {
                let local_time = unix_to_utc(entry.dt?.checked_add(offset)?)?.naive_utc();
                let main = entry.main.as_ref();
                let weather = entry.weather.first();

                Some(ForecastSlot {
                    local_time,
                    temp_min_c: normalize::temperature(main.and_then(|m| m.temp_min.or(m.temp))),
                    temp_max_c: normalize::temperature(main.and_then(|m| m.temp_max.or(m.temp))),
                    condition_code: weather.and_then(|w| w.id),
                    description: weather.and_then(|w| w.description.clone()),
                    precipitation_probability_pct: normalize::fraction_to_percent(entry.pop),
                })
            })
            .collect();

        normalize::aggregate_daily(&slots, max_days, ConditionCategory::from_openweather_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn current_payload_is_normalized() {
        let raw: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "dt": 1772366400,
            "name": "London",
            "main": { "temp": 15.0, "feels_like": 14.2, "humidity": 82, "pressure": 1009 },
            "weather": [{ "id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04n" }],
            "wind": { "speed": 5.1 }
        }))
        .expect("valid payload");

        let c = raw.to_current();
        assert_eq!(c.temperature_c, 15.0);
        assert_eq!(c.humidity_pct, 82);
        assert_eq!(c.pressure_hpa, 1009.0);
        assert_eq!(c.wind_speed_ms, 5.1);
        assert_eq!(c.category, ConditionCategory::Clouds);
        assert_eq!(c.description, "overcast clouds");
        assert_eq!(c.icon, "03n");
        assert_eq!(c.precipitation_probability_pct, 0);
        assert!(c.observed_at.is_some());
    }

    #[test]
    fn empty_current_payload_is_total() {
        let raw: OwCurrentResponse = serde_json::from_str(r#"{"weather": []}"#).expect("valid");
        let c = raw.to_current();

        assert!(c.temperature_c.is_nan());
        assert_eq!(c.wind_speed_ms, 0.0);
        assert_eq!(c.category, ConditionCategory::FALLBACK);
        assert_eq!(c.description, "Clear");
        assert_eq!(c.icon, "01d");
    }

    #[test]
    fn forecast_groups_by_city_local_date() {
        // 2026-03-01T23:00Z is already 2026-03-02 in UTC+2
        let raw: OwForecastResponse = serde_json::from_value(serde_json::json!({
            "city": { "name": "Athens", "country": "GR", "timezone": 7200 },
            "list": [
                { "dt": 1772406000, "main": { "temp_min": 9.0, "temp_max": 11.0 },
                  "weather": [{ "id": 500, "description": "light rain" }], "pop": 0.6 },
                { "dt": 1772409600, "main": { "temp_min": 8.0, "temp_max": 10.0 },
                  "weather": [{ "id": 800, "description": "clear sky" }] },
                { "dt": 1772452800, "main": { "temp": 16.0 },
                  "weather": [{ "id": 801, "description": "few clouds" }], "pop": 0.1 }
            ]
        }))
        .expect("valid payload");

        let series = raw.to_forecast(5);
        assert_eq!(series.len(), 1);

        let day = &series.days()[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(day.min_temp_c, 8.0);
        assert_eq!(day.max_temp_c, 16.0);
        assert_eq!(day.category, ConditionCategory::Clouds);
        assert_eq!(day.description, "few clouds");
        assert_eq!(day.precipitation_probability_pct, 60);
    }

    #[test]
    fn forecast_skips_entries_without_timestamp() {
        let raw: OwForecastResponse = serde_json::from_value(serde_json::json!({
            "list": [ { "main": { "temp": 1.0 } } ]
        }))
        .expect("valid payload");

        assert!(raw.to_forecast(5).is_empty());
    }
}
