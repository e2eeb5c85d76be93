use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    condition::{ConditionCategory, wmo_description},
    error::WeatherError,
    model::{CurrentConditions, ForecastDay, ForecastSeries, LocationQuery, Place},
    normalize::{self, CurrentPayload, ForecastPayload, MISSING_CODE},
    provider::{LocationResolver, ProviderId, Stage, WeatherFetcher, WeatherProvider, get_json},
};

const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,\
surface_pressure,wind_speed_10m,weather_code,is_day,precipitation_probability";

const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max";

pub const DEFAULT_FORECAST_DAYS: usize = 5;
const MAX_FORECAST_DAYS: usize = 16;

/// Open-Meteo has no reverse geocoder, coordinates go through Nominatim.
#[derive(Debug, Clone)]
pub struct OpenMeteoEndpoints {
    pub geocoding: String,
    pub reverse: String,
    pub forecast: String,
}

impl Default for OpenMeteoEndpoints {
    fn default() -> Self {
        Self {
            geocoding: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            reverse: "https://nominatim.openstreetmap.org/reverse".to_string(),
            forecast: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

impl OpenMeteoEndpoints {
    /// All three endpoints under one host, e.g. a local mirror or a mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            geocoding: format!("{base}/v1/search"),
            reverse: format!("{base}/reverse"),
            forecast: format!("{base}/v1/forecast"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    endpoints: OpenMeteoEndpoints,
    forecast_days: usize,
}

impl OpenMeteoProvider {
    pub fn new(http: Client, endpoints: OpenMeteoEndpoints) -> Self {
        Self { http, endpoints, forecast_days: DEFAULT_FORECAST_DAYS }
    }

    pub fn with_forecast_days(mut self, days: usize) -> Self {
        self.forecast_days = days.clamp(1, MAX_FORECAST_DAYS);
        self
    }

    async fn search_city(&self, name: &str) -> Result<Place, WeatherError> {
        tracing::debug!(city = name, url = %self.endpoints.geocoding, "open-meteo geocoding");

        let request = self.http.get(&self.endpoints.geocoding).query(&[
            ("name", name),
            ("count", "1"),
            ("language", "en"),
            ("format", "json"),
        ]);
        let parsed: GeocodingResponse =
            get_json(request, Stage::Geocoding, "Open-Meteo geocoding").await?;

        let first = parsed
            .results
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| WeatherError::PlaceNotFound(name.to_string()))?;

        let (Some(latitude), Some(longitude)) = (first.latitude, first.longitude) else {
            return Err(WeatherError::MalformedPayload(
                "Open-Meteo geocoding result has no coordinates".into(),
            ));
        };

        Ok(Place {
            name: first.name.unwrap_or_else(|| name.to_string()),
            country_code: first.country_code.unwrap_or_default().to_uppercase(),
            latitude,
            longitude,
        })
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Place, WeatherError> {
        tracing::debug!(latitude, longitude, url = %self.endpoints.reverse, "nominatim reverse");

        let request = self.http.get(&self.endpoints.reverse).query(&[
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("zoom", "10".to_string()),
        ]);
        let parsed: ReverseResponse =
            get_json(request, Stage::Geocoding, "Nominatim reverse geocoding").await?;

        let label = format!("{latitude:.4}, {longitude:.4}");
        if let Some(reason) = parsed.error {
            tracing::debug!(%reason, "nominatim found nothing");
            return Err(WeatherError::PlaceNotFound(label));
        }

        let address = parsed.address.ok_or_else(|| WeatherError::PlaceNotFound(label.clone()))?;
        let country_code = address.country_code.clone().unwrap_or_default().to_uppercase();
        let name = address.place_name().ok_or(WeatherError::PlaceNotFound(label))?;

        Ok(Place { name, country_code, latitude, longitude })
    }

    fn coordinates(place: &Place) -> [(&'static str, String); 2] {
        [("latitude", place.latitude.to_string()), ("longitude", place.longitude.to_string())]
    }
}

#[async_trait]
impl LocationResolver for OpenMeteoProvider {
    async fn resolve(&self, query: &LocationQuery) -> Result<Place, WeatherError> {
        let place = match query {
            LocationQuery::City(name) => self.search_city(name).await?,
            LocationQuery::Coordinates { latitude, longitude } => {
                self.reverse(*latitude, *longitude).await?
            }
        };

        tracing::info!(place = %place.display_name(), "resolved location");
        Ok(place)
    }
}

#[async_trait]
impl WeatherFetcher for OpenMeteoProvider {
    async fn fetch_current(&self, place: &Place) -> Result<CurrentConditions, WeatherError> {
        let request = self
            .http
            .get(&self.endpoints.forecast)
            .query(&Self::coordinates(place))
            .query(&[("current", CURRENT_FIELDS), ("wind_speed_unit", "ms"), ("timezone", "auto")]);

        let parsed: CurrentResponse =
            get_json(request, Stage::Weather, "Open-Meteo current weather").await?;
        Ok(parsed.to_current())
    }

    async fn fetch_forecast(&self, place: &Place) -> Result<ForecastSeries, WeatherError> {
        let request = self
            .http
            .get(&self.endpoints.forecast)
            .query(&Self::coordinates(place))
            .query(&[
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", self.forecast_days.to_string()),
            ]);

        let parsed: DailyResponse =
            get_json(request, Stage::Weather, "Open-Meteo daily forecast").await?;
        Ok(parsed.to_forecast(self.forecast_days))
    }
}

impl WeatherProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GeocodingResult {
    pub name: Option<String>,
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReverseResponse {
    pub error: Option<String>,
    pub address: Option<ReverseAddress>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReverseAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country_code: Option<String>,
}

impl ReverseAddress {
    fn place_name(self) -> Option<String> {
        self.city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .or(self.county)
            .or(self.state)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CurrentResponse {
    pub utc_offset_seconds: Option<i64>,
    pub current: Option<CurrentBlock>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CurrentBlock {
    /// Local time, `YYYY-MM-DDTHH:MM`.
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub surface_pressure: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub weather_code: Option<i32>,
    pub is_day: Option<u8>,
    pub precipitation_probability: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DailyResponse {
    pub daily: Option<DailyBlock>,
}

/// Column-oriented: entry `i` of every array belongs to `time[i]`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DailyBlock {
    pub time: Vec<String>,
    pub weather_code: Vec<Option<i32>>,
    pub temperature_2m_max: Vec<Option<f64>>,
    pub temperature_2m_min: Vec<Option<f64>>,
    pub precipitation_probability_max: Vec<Option<f64>>,
}

fn column_at(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

fn local_to_utc(local: &str, offset_secs: i64) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M").ok()?;
    let utc = naive.checked_sub_signed(TimeDelta::try_seconds(offset_secs)?)?;
    Some(utc.and_utc())
}

impl CurrentPayload for CurrentResponse {
    fn to_current(&self) -> CurrentConditions {
        let empty = CurrentBlock::default();
        let c = self.current.as_ref().unwrap_or(&empty);

        let code = c.weather_code.unwrap_or(MISSING_CODE);
        let category = ConditionCategory::from_wmo_code(code);
        let daytime = c.is_day.map(|d| d != 0).unwrap_or(true);

        CurrentConditions {
            temperature_c: normalize::temperature(c.temperature_2m),
            feels_like_c: normalize::temperature(c.apparent_temperature),
            humidity_pct: normalize::percent(c.relative_humidity_2m),
            pressure_hpa: normalize::measurement(c.surface_pressure),
            wind_speed_ms: normalize::measurement(c.wind_speed_10m),
            condition_code: code,
            category,
            description: wmo_description(code).to_string(),
            icon: category.icon(daytime),
            precipitation_probability_pct: normalize::percent(c.precipitation_probability),
            observed_at: c
                .time
                .as_deref()
                .and_then(|t| local_to_utc(t, self.utc_offset_seconds.unwrap_or(0))),
        }
    }
}

impl ForecastPayload for DailyResponse {
    fn to_forecast(&self, max_days: usize) -> ForecastSeries {
        let Some(daily) = self.daily.as_ref() else {
            return ForecastSeries::default();
        };

        let days = daily
            .time
            .iter()
            .enumerate()
            .filter_map(|(i, raw_date)| {
                let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").ok()?;
                let code = daily.weather_code.get(i).copied().flatten().unwrap_or(MISSING_CODE);
                let category = ConditionCategory::from_wmo_code(code);

                Some(ForecastDay {
                    date,
                    min_temp_c: normalize::temperature(column_at(&daily.temperature_2m_min, i)),
                    max_temp_c: normalize::temperature(column_at(&daily.temperature_2m_max, i)),
                    condition_code: code,
                    category,
                    description: wmo_description(code).to_string(),
                    icon: category.icon(true),
                    precipitation_probability_pct: normalize::percent(column_at(
                        &daily.precipitation_probability_max,
                        i,
                    )),
                })
            })
            .take(max_days)
            .collect();

        ForecastSeries::new(days)
    }
}
