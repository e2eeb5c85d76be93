use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{condition::ConditionCategory, error::WeatherError};

/// What the user asked for: a city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl LocationQuery {
    pub fn city(name: &str) -> Result<Self, WeatherError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WeatherError::InvalidQuery("city name must not be empty".into()));
        }
        Ok(Self::City(name.to_string()))
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherError::InvalidQuery(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidQuery(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self::Coordinates { latitude, longitude })
    }

    /// Short description used in logs and "not found" messages.
    pub fn label(&self) -> String {
        match self {
            Self::City(name) => name.clone(),
            Self::Coordinates { latitude, longitude } => format!("{latitude:.4}, {longitude:.4}"),
        }
    }
}

/// A resolved location. Never mutated after the resolver hands it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    /// Upper-case ISO 3166-1 alpha-2, empty when unknown.
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    pub fn display_name(&self) -> String {
        if self.country_code.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country_code)
        }
    }
}

/// Current conditions, always in canonical units (Celsius, hPa, m/s).
///
/// A temperature the provider did not report is NaN, so a value holding one
/// never compares equal to anything, itself included. Check
/// `temperature_c.is_nan()` rather than comparing whole values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed_ms: f64,
    pub condition_code: i32,
    pub category: ConditionCategory,
    pub description: String,
    pub icon: String,
    pub precipitation_probability_pct: u8,
    pub observed_at: Option<DateTime<Utc>>,
}

/// One calendar day of forecast. Missing temperatures are NaN, with the same
/// equality caveat as [`CurrentConditions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub condition_code: i32,
    pub category: ConditionCategory,
    pub description: String,
    pub icon: String,
    pub precipitation_probability_pct: u8,
}

/// Ordered run of forecast days, replaced as a whole on every search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    days: Vec<ForecastDay>,
}

impl ForecastSeries {
    pub fn new(days: Vec<ForecastDay>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[ForecastDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForecastDay> {
        self.days.iter()
    }
}

impl<'a> IntoIterator for &'a ForecastSeries {
    type Item = &'a ForecastDay;
    type IntoIter = std::slice::Iter<'a, ForecastDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

/// Result of one successful search: both fetches succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub provider: String,
    pub place: Place,
    pub current: CurrentConditions,
    pub forecast: ForecastSeries,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_query_is_trimmed() {
        assert_eq!(LocationQuery::city("  London ").unwrap(), LocationQuery::City("London".into()));
    }

    #[test]
    fn blank_city_is_rejected() {
        let err = LocationQuery::city("   ").unwrap_err();
        assert!(matches!(err, WeatherError::InvalidQuery(_)));
    }

    #[test]
    fn coordinate_ranges() {
        assert!(LocationQuery::coordinates(90.0, -180.0).is_ok());
        assert!(LocationQuery::coordinates(-90.0, 180.0).is_ok());
        assert!(LocationQuery::coordinates(90.1, 0.0).is_err());
        assert!(LocationQuery::coordinates(0.0, 180.5).is_err());
        assert!(LocationQuery::coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn place_display_name() {
        let mut place = Place {
            name: "London".into(),
            country_code: "GB".into(),
            latitude: 51.5,
            longitude: -0.12,
        };
        assert_eq!(place.display_name(), "London, GB");

        place.country_code.clear();
        assert_eq!(place.display_name(), "London");
    }

    #[test]
    fn missing_temperature_breaks_equality() {
        let day = ForecastDay {
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            min_temp_c: f64::NAN,
            max_temp_c: 12.0,
            condition_code: 0,
            category: ConditionCategory::Clear,
            description: String::new(),
            icon: "01d".into(),
            precipitation_probability_pct: 0,
        };

        assert_ne!(day, day.clone());
        assert!(day.min_temp_c.is_nan());
    }
}
