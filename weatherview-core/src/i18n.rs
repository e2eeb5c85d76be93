//! Static two-language string table and locale-aware date rendering.
//!
//! Everything here is a pure function of its arguments; the active language
//! lives in [`crate::Preferences`] and is passed in on every call.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Id,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Id => "id",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Id,
            Language::Id => Language::En,
        }
    }

    pub const fn all() -> &'static [Language] {
        &[Language::En, Language::Id]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "en" | "en-us" | "english" => Ok(Language::En),
            "id" | "id-id" | "indonesian" => Ok(Language::Id),
            _ => Err(anyhow::anyhow!("Unknown language '{value}'. Supported languages: en, id.")),
        }
    }
}

// (key, en, id)
const STRINGS: &[(&str, &str, &str)] = &[
    ("ui.search", "Search", "Cari"),
    ("ui.searchPlaceholder", "Enter city name...", "Masukkan nama kota..."),
    ("ui.prompt", "Enter a city name to get started", "Masukkan nama kota untuk memulai"),
    ("ui.forecast", "5-Day Forecast", "Prakiraan 5 Hari"),
    ("ui.feelsLike", "Feels Like", "Terasa Seperti"),
    ("ui.humidity", "Humidity", "Kelembaban"),
    ("ui.windSpeed", "Wind Speed", "Kecepatan Angin"),
    ("ui.pressure", "Pressure", "Tekanan"),
    ("ui.high", "High", "Tertinggi"),
    ("ui.low", "Low", "Terendah"),
    ("ui.precipitation", "chance of rain", "kemungkinan hujan"),
    ("ui.language", "Language", "Bahasa"),
    ("ui.theme", "Theme", "Tema"),
    ("ui.temperature", "Temperature", "Suhu"),
    ("ui.updated", "Updated", "Diperbarui"),
    ("ui.loading", "Loading...", "Memuat..."),
    ("ui.noData", "No weather data available", "Data cuaca tidak tersedia"),
    ("weather.Clear", "Clear", "Cerah"),
    ("weather.Clouds", "Cloudy", "Berawan"),
    ("weather.Rain", "Rain", "Hujan"),
    ("weather.Drizzle", "Drizzle", "Gerimis"),
    ("weather.Thunderstorm", "Thunderstorm", "Badai Petir"),
    ("weather.Snow", "Snow", "Salju"),
    ("weather.Mist", "Mist", "Berkabut"),
    ("unit.celsius", "Celsius", "Celsius"),
    ("unit.fahrenheit", "Fahrenheit", "Fahrenheit"),
    ("theme.light", "Light", "Terang"),
    ("theme.dark", "Dark", "Gelap"),
    ("language.en", "English", "Inggris"),
    ("language.id", "Indonesian", "Indonesia"),
    ("error.placeNotFound", "City not found", "Kota tidak ditemukan"),
    ("error.resolverUnavailable", "Location service unavailable", "Layanan lokasi tidak tersedia"),
    ("error.fetchFailed", "Error loading weather data", "Error memuat data cuaca"),
    ("error.malformedPayload", "Unexpected weather data", "Data cuaca tidak dikenali"),
    ("error.invalidQuery", "Invalid search", "Pencarian tidak valid"),
];

/// Look up `key` in the string table. Unknown keys come back unchanged.
pub fn translate(key: &str, language: Language) -> &str {
    STRINGS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, en, id)| match language {
            Language::En => *en,
            Language::Id => *id,
        })
        .unwrap_or(key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    Short,
    Long,
}

const DAYS_EN: [(&str, &str); 7] = [
    ("Sun", "Sunday"),
    ("Mon", "Monday"),
    ("Tue", "Tuesday"),
    ("Wed", "Wednesday"),
    ("Thu", "Thursday"),
    ("Fri", "Friday"),
    ("Sat", "Saturday"),
];

const DAYS_ID: [(&str, &str); 7] = [
    ("Min", "Minggu"),
    ("Sen", "Senin"),
    ("Sel", "Selasa"),
    ("Rab", "Rabu"),
    ("Kam", "Kamis"),
    ("Jum", "Jumat"),
    ("Sab", "Sabtu"),
];

const MONTHS_EN: [(&str, &str); 12] = [
    ("Jan", "January"),
    ("Feb", "February"),
    ("Mar", "March"),
    ("Apr", "April"),
    ("May", "May"),
    ("Jun", "June"),
    ("Jul", "July"),
    ("Aug", "August"),
    ("Sep", "September"),
    ("Oct", "October"),
    ("Nov", "November"),
    ("Dec", "December"),
];

const MONTHS_ID: [(&str, &str); 12] = [
    ("Jan", "Januari"),
    ("Feb", "Februari"),
    ("Mar", "Maret"),
    ("Apr", "April"),
    ("Mei", "Mei"),
    ("Jun", "Juni"),
    ("Jul", "Juli"),
    ("Agu", "Agustus"),
    ("Sep", "September"),
    ("Okt", "Oktober"),
    ("Nov", "November"),
    ("Des", "Desember"),
];

fn pick(pair: (&'static str, &'static str), style: NameStyle) -> &'static str {
    match style {
        NameStyle::Short => pair.0,
        NameStyle::Long => pair.1,
    }
}

pub fn day_name(date: NaiveDate, language: Language, style: NameStyle) -> &'static str {
    let idx = date.weekday().num_days_from_sunday() as usize;
    let table = match language {
        Language::En => &DAYS_EN,
        Language::Id => &DAYS_ID,
    };
    pick(table[idx], style)
}

pub fn month_name(date: NaiveDate, language: Language, style: NameStyle) -> &'static str {
    let idx = date.month0() as usize;
    let table = match language {
        Language::En => &MONTHS_EN,
        Language::Id => &MONTHS_ID,
    };
    pick(table[idx], style)
}

/// Compact label used for forecast rows: "Mon, Jan 5" / "Sen, 5 Jan".
pub fn format_date(date: NaiveDate, language: Language) -> String {
    let day = day_name(date, language, NameStyle::Short);
    let month = month_name(date, language, NameStyle::Short);
    match language {
        Language::En => format!("{day}, {month} {}", date.day()),
        Language::Id => format!("{day}, {} {month}", date.day()),
    }
}

/// "Monday, January 5, 2026" / "Senin, 5 Januari 2026".
pub fn format_full_date(date: NaiveDate, language: Language) -> String {
    let day = day_name(date, language, NameStyle::Long);
    let month = month_name(date, language, NameStyle::Long);
    match language {
        Language::En => format!("{day}, {month} {}, {}", date.day(), date.year()),
        Language::Id => format!("{day}, {} {month} {}", date.day(), date.year()),
    }
}

/// 24-hour clock; Indonesian uses a dot separator.
pub fn format_time(time: NaiveTime, language: Language) -> String {
    let sep = match language {
        Language::En => ':',
        Language::Id => '.',
    };
    format!("{:02}{sep}{:02}", time.hour(), time.minute())
}
