//! Plain-text rendering of the session view. Unit and language conversion
//! happen here and nowhere earlier.

use std::fmt::Write;
use weatherview_core::{
    Preferences, Theme, ViewState, WeatherReport, i18n, icon_url, to_display_temperature,
    translate,
};

struct Palette {
    accent: &'static str,
    dim: &'static str,
    reset: &'static str,
}

impl Palette {
    fn new(theme: Theme, color: bool) -> Self {
        if !color {
            return Self { accent: "", dim: "", reset: "" };
        }
        match theme {
            Theme::Light => Self { accent: "\x1b[34m", dim: "\x1b[90m", reset: "\x1b[0m" },
            Theme::Dark => Self { accent: "\x1b[96m", dim: "\x1b[37m", reset: "\x1b[0m" },
        }
    }
}

pub fn render_view(view: &ViewState, prefs: Preferences, color: bool) -> String {
    let lang = prefs.language;
    if view.loading {
        return format!("{}\n", translate("ui.loading", lang));
    }
    if let Some(error) = &view.error {
        return format!("{error}\n");
    }
    match &view.report {
        Some(report) => render_report(report, prefs, color),
        None => format!("{}\n", translate("ui.prompt", lang)),
    }
}

pub fn render_report(report: &WeatherReport, prefs: Preferences, color: bool) -> String {
    let lang = prefs.language;
    let unit = prefs.temperature_unit;
    let p = Palette::new(prefs.theme, color);
    let current = &report.current;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}{}{}  {}({:.2}, {:.2}){}",
        p.accent,
        report.place.display_name(),
        p.reset,
        p.dim,
        report.place.latitude,
        report.place.longitude,
        p.reset
    );
    if let Some(observed) = current.observed_at {
        let _ = writeln!(
            out,
            "{}{}: {} {} UTC{}",
            p.dim,
            translate("ui.updated", lang),
            i18n::format_full_date(observed.date_naive(), lang),
            i18n::format_time(observed.time(), lang),
            p.reset
        );
    }

    let _ = writeln!(
        out,
        "{} ({})  {}",
        translate(&current.category.translation_key(), lang),
        current.description,
        icon_url(&current.icon)
    );

    let rows = [
        ("ui.temperature", to_display_temperature(current.temperature_c, unit).to_string()),
        ("ui.feelsLike", to_display_temperature(current.feels_like_c, unit).to_string()),
        ("ui.humidity", format!("{}%", current.humidity_pct)),
        ("ui.pressure", format!("{:.0} hPa", current.pressure_hpa)),
        ("ui.windSpeed", format!("{:.1} m/s", current.wind_speed_ms)),
        ("ui.precipitation", format!("{}%", current.precipitation_probability_pct)),
    ];
    for (key, value) in rows {
        let _ = writeln!(out, "  {:<18} {}", translate(key, lang), value);
    }

    if !report.forecast.is_empty() {
        let _ = writeln!(out, "\n{}{}{}", p.accent, translate("ui.forecast", lang), p.reset);
        for day in &report.forecast {
            let _ = writeln!(
                out,
                "  {:<12} {} {:>7}  {} {:>7}  {:<14} {}% {}",
                i18n::format_date(day.date, lang),
                translate("ui.high", lang),
                to_display_temperature(day.max_temp_c, unit).to_string(),
                translate("ui.low", lang),
                to_display_temperature(day.min_temp_c, unit).to_string(),
                translate(&day.category.translation_key(), lang),
                day.precipitation_probability_pct,
                translate("ui.precipitation", lang),
            );
        }
    }

    out
}

pub fn render_preferences(prefs: Preferences) -> String {
    let lang = prefs.language;
    let unit_key = format!("unit.{}", prefs.temperature_unit.as_str());
    let lang_key = format!("language.{}", prefs.language.as_str());
    let theme_key = format!("theme.{}", prefs.theme.as_str());

    format!(
        "{:<12} {}\n{:<12} {}\n{:<12} {}\n",
        translate("ui.temperature", lang),
        translate(&unit_key, lang),
        translate("ui.language", lang),
        translate(&lang_key, lang),
        translate("ui.theme", lang),
        translate(&theme_key, lang),
    )
}
