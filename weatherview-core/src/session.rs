//! Presentation state for a sequence of searches.
//!
//! Every search takes a [`SearchTicket`]; only the most recently issued
//! ticket may change the view, so a slow response to an older search can
//! never overwrite a newer one.

use crate::{error::WeatherError, i18n::Language, model::WeatherReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// What the presentation layer shows right now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub loading: bool,
    pub report: Option<WeatherReport>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Shown,
    Failed(String),
    /// A newer search was started; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct SearchSession {
    issued: u64,
    view: ViewState,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Start a search: supersedes any search still in flight.
    pub fn begin(&mut self) -> SearchTicket {
        self.issued += 1;
        self.view.loading = true;
        self.view.error = None;
        SearchTicket(self.issued)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Apply the result of the search identified by `ticket`.
    ///
    /// A failure clears the previous report; nothing partial is ever kept.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        result: Result<WeatherReport, WeatherError>,
        language: Language,
    ) -> SearchOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.issued,
                "discarding stale search result"
            );
            return SearchOutcome::Stale;
        }

        self.view.loading = false;
        match result {
            Ok(report) => {
                self.view.report = Some(report);
                self.view.error = None;
                SearchOutcome::Shown
            }
            Err(err) => {
                tracing::warn!(error = %err, "search failed");
                let message = err.user_message(language);
                self.view.report = None;
                self.view.error = Some(message.clone());
                SearchOutcome::Failed(message)
            }
        }
    }
}
