//! Temperature conversion applied at display time.
//!
//! Reports are always stored in Celsius; nothing in this module is ever
//! written back into a model.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "c" | "celsius" | "metric" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" | "imperial" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Round to one decimal place. NaN stays NaN.
pub fn round_temperature(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A temperature ready to be shown in a given unit.
///
/// `value` is `None` when the source reading was not a number; the
/// `Display` impl then prints a `--` placeholder instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTemperature {
    value: Option<f64>,
    unit: TemperatureUnit,
}

impl DisplayTemperature {
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }
}

impl fmt::Display for DisplayTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{}{}", round_temperature(v), self.unit.symbol()),
            None => write!(f, "--{}", self.unit.symbol()),
        }
    }
}

/// Convert a canonical Celsius reading for display.
///
/// Celsius passes through untouched; Fahrenheit is rounded to one decimal.
pub fn to_display_temperature(celsius: f64, unit: TemperatureUnit) -> DisplayTemperature {
    let value = if celsius.is_finite() {
        Some(match unit {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => round_temperature(celsius_to_fahrenheit(celsius)),
        })
    } else {
        None
    };

    DisplayTemperature { value, unit }
}
