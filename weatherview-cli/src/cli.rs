use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use weatherview_core::{
    Config, FileStore, Language, LocationQuery, PreferenceChange, PreferenceManager, Preferences,
    ProviderId, SearchOutcome, SearchSession, TemperatureUnit, WeatherService,
    provider::provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherview", version, about = "Current weather and multi-day forecast")]
pub struct Cli {
    /// Log request details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials and endpoints for a specific provider.
    Configure {
        /// Provider short name, e.g. "open-meteo" or "openweather".
        provider: String,
    },

    /// Show current weather and forecast for a city or a coordinate pair.
    Show {
        /// City name, e.g. "London".
        #[arg(required_unless_present = "lat", conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Use this provider instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Temperature unit for this run only (celsius / fahrenheit).
        #[arg(long)]
        unit: Option<TemperatureUnit>,

        /// Language for this run only (en / id).
        #[arg(long)]
        lang: Option<Language>,

        /// Number of forecast days.
        #[arg(long)]
        days: Option<usize>,
    },

    /// Show or change saved preferences.
    Prefs {
        #[command(subcommand)]
        action: Option<PrefsAction>,
    },
}

#[derive(Debug, Subcommand)]
pub enum PrefsAction {
    Show,
    ToggleUnit,
    ToggleLanguage,
    ToggleTheme,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { city, lat, lon, provider, unit, lang, days } => {
                let query = match (city, lat, lon) {
                    (Some(city), _, _) => LocationQuery::city(&city)?,
                    (None, Some(lat), Some(lon)) => LocationQuery::coordinates(lat, lon)?,
                    _ => bail!("Provide a city name or both --lat and --lon."),
                };

                let mut prefs = load_preferences()?.get();
                if let Some(unit) = unit {
                    prefs.temperature_unit = unit;
                }
                if let Some(lang) = lang {
                    prefs.language = lang;
                }

                show(query, provider.as_deref(), days, prefs).await
            }
            Command::Prefs { action } => prefs(action.unwrap_or(PrefsAction::Show)),
        }
    }
}

fn load_preferences() -> anyhow::Result<PreferenceManager<FileStore>> {
    let store = FileStore::open_default().context("Failed to open preference store")?;
    Ok(PreferenceManager::load(store))
}

async fn show(
    query: LocationQuery,
    provider: Option<&str>,
    days: Option<usize>,
    prefs: Preferences,
) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if days.is_some() {
        config.forecast_days = days;
    }

    let id = match provider {
        Some(p) => ProviderId::try_from(p)?,
        None => config.default_provider_id()?,
    };
    let service = WeatherService::new(provider_from_config(id, &config)?);
    tracing::debug!(?query, provider = %id, "starting lookup");

    let mut session = SearchSession::new();
    let ticket = session.begin();
    let result = service.lookup(&query).await;

    match session.complete(ticket, result, prefs.language) {
        SearchOutcome::Shown => {
            let color = std::io::stdout().is_terminal();
            print!("{}", render::render_view(session.view(), prefs, color));
            Ok(())
        }
        SearchOutcome::Failed(message) => Err(anyhow!(message)),
        SearchOutcome::Stale => Ok(()),
    }
}

fn prefs(action: PrefsAction) -> anyhow::Result<()> {
    let mut manager = load_preferences()?;

    let change = match action {
        PrefsAction::Show => None,
        PrefsAction::ToggleUnit => Some(PreferenceChange::ToggleUnit),
        PrefsAction::ToggleLanguage => Some(PreferenceChange::ToggleLanguage),
        PrefsAction::ToggleTheme => Some(PreferenceChange::ToggleTheme),
    };

    let current = match change {
        Some(change) => manager.apply(change)?,
        None => manager.get(),
    };

    print!("{}", render::render_preferences(current));
    println!("Stored in {}", manager.store().path().display());
    Ok(())
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if id.requires_api_key() {
        let api_key = inquire::Password::new(&format!("API key for {id}:"))
            .without_confirmation()
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .prompt()
            .context("Failed to read API key")?;

        if api_key.trim().is_empty() {
            bail!("API key must not be empty.");
        }
        config.upsert_provider_api_key(id, api_key.trim().to_string());
    }

    let base_url = inquire::Text::new("Custom base URL (leave empty for the public API):")
        .prompt()
        .context("Failed to read base URL")?;
    let entry = config.providers.entry(id.as_str().to_string()).or_default();
    entry.base_url = Some(base_url.trim().to_string()).filter(|url| !url.is_empty());

    let current_default = config.default_provider_id()?;
    if current_default != id {
        let make_default = inquire::Confirm::new(&format!("Make {id} the default provider?"))
            .with_default(true)
            .prompt()
            .context("Failed to read answer")?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    config.save()?;
    println!("Saved configuration for {id} to {}", Config::config_file_path()?.display());
    Ok(())
}
