//! Provider payload → canonical model.
//!
//! Each provider module owns its raw payload types and implements
//! [`CurrentPayload`] / [`ForecastPayload`] for them. Normalization is total:
//! every raw field is optional and a missing value degrades to a default
//! instead of an error.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

use crate::{
    condition::ConditionCategory,
    model::{CurrentConditions, ForecastDay, ForecastSeries},
};

pub trait CurrentPayload {
    fn to_current(&self) -> CurrentConditions;
}

pub trait ForecastPayload {
    /// At most `max_days` days, earliest first.
    fn to_forecast(&self, max_days: usize) -> ForecastSeries;
}

/// Condition code recorded when a payload carries none.
pub const MISSING_CODE: i32 = 0;

/// Missing temperatures stay visible as NaN so the display shows a placeholder.
pub(crate) fn temperature(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}

/// Missing or non-finite measurements become zero.
pub(crate) fn measurement(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Percentage clamped to 0..=100, rounded.
pub(crate) fn percent(value: Option<f64>) -> u8 {
    measurement(value).round().clamp(0.0, 100.0) as u8
}

/// Probability in 0..=1 as a percentage.
pub(crate) fn fraction_to_percent(value: Option<f64>) -> u8 {
    percent(value.map(|v| v * 100.0))
}

/// One entry of a sub-daily forecast, already in local time.
#[derive(Debug, Clone)]
pub struct ForecastSlot {
    pub local_time: NaiveDateTime,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition_code: Option<i32>,
    pub description: Option<String>,
    pub precipitation_probability_pct: u8,
}

/// Fold sub-daily slots into days: lowest minimum, highest maximum, highest
/// precipitation probability, and the condition of the slot nearest noon.
pub fn aggregate_daily(
    slots: &[ForecastSlot],
    max_days: usize,
    categorize: fn(i32) -> ConditionCategory,
) -> ForecastSeries {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ForecastSlot>> = BTreeMap::new();
    for slot in slots {
        by_date.entry(slot.local_time.date()).or_default().push(slot);
    }

    let days = by_date
        .into_iter()
        .take(max_days)
        .map(|(date, slots)| {
            let min_temp_c = slots.iter().fold(f64::NAN, |acc, s| acc.min(s.temp_min_c));
            let max_temp_c = slots.iter().fold(f64::NAN, |acc, s| acc.max(s.temp_max_c));
            let precipitation_probability_pct =
                slots.iter().map(|s| s.precipitation_probability_pct).max().unwrap_or(0);

            let noon = slots.iter().min_by_key(|s| {
                let minutes = s.local_time.hour() as i64 * 60 + s.local_time.minute() as i64;
                (minutes - 12 * 60).abs()
            });

            let (condition_code, description) = noon
                .map(|s| (s.condition_code, s.description.clone()))
                .unwrap_or((None, None));
            let category = condition_code.map(categorize).unwrap_or(ConditionCategory::FALLBACK);

            ForecastDay {
                date,
                min_temp_c,
                max_temp_c,
                condition_code: condition_code.unwrap_or(MISSING_CODE),
                category,
                description: description.unwrap_or_else(|| category.as_str().to_string()),
                icon: category.icon(true),
                precipitation_probability_pct,
            }
        })
        .collect();

    ForecastSeries::new(days)
}
