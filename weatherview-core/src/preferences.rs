//! User preferences and the key-value store that persists them.
//!
//! [`PreferenceManager`] is the only writer: it reads the store once when
//! loaded and writes through after every [`PreferenceChange`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{i18n::Language, units::TemperatureUnit};

pub const KEY_TEMPERATURE_UNIT: &str = "temperatureUnit";
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_THEME: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme '{value}'. Supported themes: light, dark.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub temperature_unit: TemperatureUnit,
    pub language: Language,
    pub theme: Theme,
}

/// Flat string key-value persistence, the shape of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-process store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// TOML table of strings on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at the platform config location.
    pub fn open_default() -> Result<Self> {
        Self::open(&crate::config::config_dir()?.join("preferences.toml"))
    }

    /// Open (or lazily create) a store at `path`. An unreadable file is an error,
    /// a missing one is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read preferences file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse preferences file: {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path: path.to_path_buf(), entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string(entries).context("Failed to serialize preferences")?;
        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write preferences file: {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)?;
        self.entries = entries;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceChange {
    ToggleUnit,
    ToggleLanguage,
    ToggleTheme,
    SetUnit(TemperatureUnit),
    SetLanguage(Language),
    SetTheme(Theme),
}

/// Owns the current [`Preferences`] and the store backing them.
#[derive(Debug)]
pub struct PreferenceManager<S: KeyValueStore> {
    store: S,
    current: Preferences,
}

fn read_or_default<T: FromStr + Default>(store: &impl KeyValueStore, key: &str) -> T {
    match store.get(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unrecognised preference value");
            T::default()
        }),
        None => T::default(),
    }
}

impl<S: KeyValueStore> PreferenceManager<S> {
    pub fn load(store: S) -> Self {
        let current = Preferences {
            temperature_unit: read_or_default(&store, KEY_TEMPERATURE_UNIT),
            language: read_or_default(&store, KEY_LANGUAGE),
            theme: read_or_default(&store, KEY_THEME),
        };

        tracing::debug!(?current, "preferences loaded");
        Self { store, current }
    }

    pub fn get(&self) -> Preferences {
        self.current
    }

    /// Apply one change and persist the affected key before returning.
    ///
    /// On a store error the in-memory value is left unchanged.
    pub fn apply(&mut self, change: PreferenceChange) -> Result<Preferences> {
        let mut next = self.current;
        match change {
            PreferenceChange::ToggleUnit => next.temperature_unit = next.temperature_unit.toggled(),
            PreferenceChange::ToggleLanguage => next.language = next.language.toggled(),
            PreferenceChange::ToggleTheme => next.theme = next.theme.toggled(),
            PreferenceChange::SetUnit(unit) => next.temperature_unit = unit,
            PreferenceChange::SetLanguage(language) => next.language = language,
            PreferenceChange::SetTheme(theme) => next.theme = theme,
        }

        let (key, value) = match change {
            PreferenceChange::ToggleUnit | PreferenceChange::SetUnit(_) => {
                (KEY_TEMPERATURE_UNIT, next.temperature_unit.as_str())
            }
            PreferenceChange::ToggleLanguage | PreferenceChange::SetLanguage(_) => {
                (KEY_LANGUAGE, next.language.as_str())
            }
            PreferenceChange::ToggleTheme | PreferenceChange::SetTheme(_) => {
                (KEY_THEME, next.theme.as_str())
            }
        };

        self.store.set(key, value)?;
        self.current = next;
        tracing::debug!(key, value, "preference updated");
        Ok(next)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    #[test]
    fn empty_store_gives_defaults() {
        let prefs = PreferenceManager::load(MemoryStore::new()).get();
        assert_eq!(prefs.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(prefs.language, Language::En);
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn unrecognised_values_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(KEY_TEMPERATURE_UNIT, "kelvin").unwrap();
        store.set(KEY_LANGUAGE, "id").unwrap();

        let prefs = PreferenceManager::load(store).get();
        assert_eq!(prefs.temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(prefs.language, Language::Id);
    }

    #[test]
    fn toggles_write_through() {
        let mut manager = PreferenceManager::load(MemoryStore::new());

        let prefs = manager.apply(PreferenceChange::ToggleUnit).unwrap();
        assert_eq!(prefs.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(manager.store().get(KEY_TEMPERATURE_UNIT).as_deref(), Some("fahrenheit"));

        manager.apply(PreferenceChange::ToggleLanguage).unwrap();
        manager.apply(PreferenceChange::SetTheme(Theme::Dark)).unwrap();
        assert_eq!(manager.store().get(KEY_LANGUAGE).as_deref(), Some("id"));
        assert_eq!(manager.store().get(KEY_THEME).as_deref(), Some("dark"));

        let prefs = manager.apply(PreferenceChange::ToggleUnit).unwrap();
        assert_eq!(prefs.temperature_unit, TemperatureUnit::Celsius);
    }

    #[test]
    fn failed_persist_keeps_previous_value() {
        let mut manager = PreferenceManager::load(FailingStore);
        assert!(manager.apply(PreferenceChange::ToggleTheme).is_err());
        assert_eq!(manager.get().theme, Theme::Light);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs").join("preferences.toml");

        let mut manager = PreferenceManager::load(FileStore::open(&path).unwrap());
        manager.apply(PreferenceChange::SetUnit(TemperatureUnit::Fahrenheit)).unwrap();
        manager.apply(PreferenceChange::SetLanguage(Language::Id)).unwrap();
        drop(manager);

        let reloaded = PreferenceManager::load(FileStore::open(&path).unwrap()).get();
        assert_eq!(reloaded.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(reloaded.language, Language::Id);
        assert_eq!(reloaded.theme, Theme::Light);
    }

    #[test]
    fn failed_file_write_does_not_reach_disk_later() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("preferences.toml");

        let mut manager = PreferenceManager::load(FileStore::open(&path).unwrap());
        assert!(manager.apply(PreferenceChange::ToggleTheme).is_err());
        assert_eq!(manager.get().theme, Theme::Light);
        assert_eq!(manager.store().get(KEY_THEME), None);

        fs::remove_file(&blocker).unwrap();
        manager.apply(PreferenceChange::ToggleUnit).unwrap();

        let reloaded = PreferenceManager::load(FileStore::open(&path).unwrap()).get();
        assert_eq!(reloaded.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(reloaded.theme, Theme::Light);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        assert!(FileStore::open(&path).is_err());
    }
}
