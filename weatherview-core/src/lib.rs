//! Core library for the `weatherview` CLI.
//!
//! This crate defines:
//! - Place resolution and weather fetching, one adapter per upstream provider
//! - Normalization of provider payloads into one canonical, Celsius-based model
//! - Display-time unit conversion and the two-language string table
//! - Persisted user preferences and on-disk configuration
//!
//! It is used by `weatherview-cli`, but can also be reused by other binaries or services.

pub mod condition;
pub mod config;
pub mod error;
pub mod i18n;
pub mod model;
pub mod normalize;
pub mod preferences;
pub mod provider;
pub mod service;
pub mod session;
pub mod units;

pub use condition::{ConditionCategory, icon_url};
pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use i18n::{Language, translate};
pub use model::{
    CurrentConditions, ForecastDay, ForecastSeries, LocationQuery, Place, WeatherReport,
};
pub use preferences::{
    FileStore, KeyValueStore, MemoryStore, PreferenceChange, PreferenceManager, Preferences, Theme,
};
pub use provider::{LocationResolver, ProviderId, WeatherFetcher, WeatherProvider};
pub use service::WeatherService;
pub use session::{SearchOutcome, SearchSession, SearchTicket, ViewState};
pub use units::{DisplayTemperature, TemperatureUnit, to_display_temperature};
