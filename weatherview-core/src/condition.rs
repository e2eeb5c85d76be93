//! Static lookup tables: provider condition codes to categories, categories
//! to icon identifiers.

use serde::{Deserialize, Serialize};

/// Host serving the two-character-plus-suffix condition icons.
pub const ICON_HOST: &str = "https://openweathermap.org/img/wn";

/// The closed set of conditions the rest of the application understands.
///
/// Codes that none of the tables recognise fall back to [`ConditionCategory::FALLBACK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionCategory {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
}

impl ConditionCategory {
    pub const FALLBACK: ConditionCategory = ConditionCategory::Clear;

    /// Stable name, also the suffix of the `weather.*` translation keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
        }
    }

    pub fn translation_key(&self) -> String {
        format!("weather.{}", self.as_str())
    }

    /// WMO weather interpretation codes as reported by Open-Meteo.
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::Clouds,
            45 | 48 => Self::Mist,
            51..=57 => Self::Drizzle,
            61..=67 | 80..=82 => Self::Rain,
            71..=77 | 85 | 86 => Self::Snow,
            95..=99 => Self::Thunderstorm,
            _ => {
                tracing::debug!(code, "unknown WMO code, using fallback category");
                Self::FALLBACK
            }
        }
    }

    /// OpenWeather condition ids (2xx thunderstorm ... 80x clouds).
    pub fn from_openweather_code(code: i32) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Mist,
            800 => Self::Clear,
            801..=804 => Self::Clouds,
            _ => {
                tracing::debug!(code, "unknown OpenWeather code, using fallback category");
                Self::FALLBACK
            }
        }
    }

    /// Icon identifier for this category, `d` or `n` suffixed.
    pub fn icon(&self, daytime: bool) -> String {
        let base = match self {
            Self::Clear => "01",
            Self::Clouds => "03",
            Self::Drizzle => "09",
            Self::Rain => "10",
            Self::Thunderstorm => "11",
            Self::Snow => "13",
            Self::Mist => "50",
        };
        let suffix = if daytime { 'd' } else { 'n' };
        format!("{base}{suffix}")
    }
}

/// Full image URL for an icon identifier produced by [`ConditionCategory::icon`].
pub fn icon_url(icon: &str) -> String {
    format!("{ICON_HOST}/{icon}@2x.png")
}

/// English description for a WMO code. Open-Meteo sends only the number.
pub fn wmo_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 | 57 => "Freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 | 67 => "Freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => ConditionCategory::from_wmo_code(code).as_str(),
    }
}
