//! City search box state machine.
//!
//! All timing and I/O lives outside: [`update`] consumes one [`SearchEvent`]
//! and returns the [`SearchEffect`]s the driver has to carry out (start a
//! timer, fetch suggestions, show a notification). Timers and requests are
//! tagged with monotonically increasing ids so late arrivals can be told
//! apart from current ones.

use std::time::Duration;

use crate::{
    config::SearchSettings,
    model::CitySuggestion,
    notify::{Notification, Severity},
};

/// Identity of an issued suggestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

/// Identity of a scheduled timer (debounce or blur grace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The input text changed (one event per keystroke).
    InputChanged(String),
    /// A debounce timer elapsed.
    TimerFired(TimerToken),
    /// A suggestion request finished. Errors arrive as display text.
    FetchCompleted { request: RequestId, result: Result<Vec<CitySuggestion>, String> },
    Focused,
    Blurred,
    /// The grace period after a blur elapsed.
    BlurGraceElapsed(TimerToken),
    /// The user clicked the suggestion at this index.
    SuggestionSelected(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEffect {
    StartDebounce { token: TimerToken, delay: Duration },
    StartBlurGrace { token: TimerToken, delay: Duration },
    FetchSuggestions { request: RequestId, query: String },
    Notify(Notification),
    Selected(CitySuggestion),
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    settings: SearchSettings,
    query: String,
    suggestions: Vec<CitySuggestion>,
    is_loading: bool,
    dismissed: bool,
    next_id: u64,
    debounce: Option<TimerToken>,
    blur: Option<TimerToken>,
    in_flight: Option<RequestId>,
}

impl SearchState {
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings, ..Self::default() }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[CitySuggestion] {
        &self.suggestions
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The list is shown when there is something in it and it was not
    /// dismissed by a blur or a selection.
    pub fn is_visible(&self) -> bool {
        !self.suggestions.is_empty() && !self.dismissed
    }

    /// Request whose response is still awaited, if any.
    pub fn pending_request(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// True while a timer or the current request is outstanding.
    pub fn is_waiting(&self) -> bool {
        self.debounce.is_some() || self.blur.is_some() || self.in_flight.is_some()
    }

    fn searchable_query(&self) -> Option<&str> {
        let trimmed = self.query.trim();
        // An empty query is never sent, whatever the configured minimum.
        let min = self.settings.min_query_len.max(1);
        (trimmed.chars().count() >= min).then_some(trimmed)
    }

    fn next_token(&mut self) -> TimerToken {
        self.next_id += 1;
        TimerToken(self.next_id)
    }

    fn next_request(&mut self) -> RequestId {
        self.next_id += 1;
        RequestId(self.next_id)
    }

    fn clear_results(&mut self) {
        self.suggestions.clear();
        self.is_loading = false;
        self.debounce = None;
        self.in_flight = None;
    }
}

/// Pure update function: applies an event to state and returns any effects.
pub fn update(mut state: SearchState, event: SearchEvent) -> (SearchState, Vec<SearchEffect>) {
    let effects = match event {
        SearchEvent::InputChanged(text) => {
            state.query = text;
            state.dismissed = false;

            if state.searchable_query().is_none() {
                // Too short: drop results now, no debounce wait.
                state.clear_results();
                Vec::new()
            } else {
                let token = state.next_token();
                state.debounce = Some(token);
                vec![SearchEffect::StartDebounce { token, delay: state.settings.debounce() }]
            }
        }
        SearchEvent::TimerFired(token) => {
            if state.debounce != Some(token) {
                tracing::debug!(?token, "ignoring stale debounce timer");
                return (state, Vec::new());
            }
            state.debounce = None;

            let query = state.searchable_query().map(str::to_owned);
            match query {
                Some(query) => {
                    let request = state.next_request();
                    state.in_flight = Some(request);
                    state.is_loading = true;
                    tracing::debug!(?request, %query, "issuing suggestion request");
                    vec![SearchEffect::FetchSuggestions { request, query }]
                }
                None => Vec::new(),
            }
        }
        SearchEvent::FetchCompleted { request, result } => {
            if state.in_flight != Some(request) {
                tracing::debug!(?request, latest = ?state.in_flight, "discarding superseded suggestions");
                return (state, Vec::new());
            }
            state.in_flight = None;
            state.is_loading = false;

            match result {
                Ok(cities) => {
                    state.suggestions = cities;
                    Vec::new()
                }
                Err(message) => {
                    tracing::warn!(%message, query = %state.query, "city search failed");
                    state.suggestions.clear();
                    vec![SearchEffect::Notify(Notification::new(
                        Severity::Warning,
                        "City search failed",
                        message,
                    ))]
                }
            }
        }
        SearchEvent::Focused => {
            state.blur = None;
            state.dismissed = false;
            Vec::new()
        }
        SearchEvent::Blurred => {
            let token = state.next_token();
            state.blur = Some(token);
            vec![SearchEffect::StartBlurGrace { token, delay: state.settings.blur_grace() }]
        }
        SearchEvent::BlurGraceElapsed(token) => {
            if state.blur == Some(token) {
                state.blur = None;
                state.dismissed = true;
            }
            Vec::new()
        }
        SearchEvent::SuggestionSelected(index) => {
            // Hidden items cannot be clicked.
            if !state.is_visible() {
                return (state, Vec::new());
            }
            let Some(city) = state.suggestions.get(index).cloned() else {
                return (state, Vec::new());
            };

            state.query = city.label();
            state.clear_results();
            state.blur = None;
            state.dismissed = true;
            vec![SearchEffect::Selected(city)]
        }
    };

    (state, effects)
}
