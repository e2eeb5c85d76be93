use thiserror::Error;

use crate::i18n::{Language, translate};

/// Everything that can go wrong between a user query and a finished report.
///
/// None of these are retried and none are fatal: the caller shows
/// [`WeatherError::user_message`] and lets the user search again.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("No place found for '{0}'")]
    PlaceNotFound(String),

    #[error("Location lookup unavailable: {0}")]
    ResolverUnavailable(String),

    #[error("Weather fetch failed: {0}")]
    FetchFailed(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl WeatherError {
    /// Translation key of the headline shown for this error.
    pub fn message_key(&self) -> &'static str {
        match self {
            WeatherError::PlaceNotFound(_) => "error.placeNotFound",
            WeatherError::ResolverUnavailable(_) => "error.resolverUnavailable",
            WeatherError::FetchFailed(_) => "error.fetchFailed",
            WeatherError::MalformedPayload(_) => "error.malformedPayload",
            WeatherError::InvalidQuery(_) => "error.invalidQuery",
        }
    }

    fn detail(&self) -> &str {
        match self {
            WeatherError::PlaceNotFound(s)
            | WeatherError::ResolverUnavailable(s)
            | WeatherError::FetchFailed(s)
            | WeatherError::MalformedPayload(s)
            | WeatherError::InvalidQuery(s) => s,
        }
    }

    /// Single human-readable line in the requested language.
    pub fn user_message(&self, language: Language) -> String {
        let headline = translate(self.message_key(), language);
        let detail = self.detail();
        if detail.is_empty() {
            headline.to_string()
        } else {
            format!("{headline}: {detail}")
        }
    }
}
