//! Tokio driver for the search state machine.
//!
//! Timers and fetches run as spawned tasks that post their outcome back on an
//! internal channel; the session applies those events one at a time. In-flight
//! HTTP requests are never aborted, their responses are dropped on arrival by
//! the request-id check in [`update`].

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

use crate::{
    config::SearchSettings,
    model::CitySuggestion,
    notify::NotificationSink,
    provider::SuggestionSource,
    search::{SearchEffect, SearchEvent, SearchState, update},
};

pub struct SearchSession {
    state: SearchState,
    source: Arc<dyn SuggestionSource>,
    sink: Arc<dyn NotificationSink>,
    tx: UnboundedSender<SearchEvent>,
    rx: UnboundedReceiver<SearchEvent>,
    debounce_task: Option<JoinHandle<()>>,
}

impl SearchSession {
    pub fn new(
        settings: SearchSettings,
        source: Arc<dyn SuggestionSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { state: SearchState::new(settings), source, sink, tx, rx, debounce_task: None }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Apply one event and start whatever it asks for. Returns the picked
    /// city when the event was a successful selection.
    ///
    /// Must be called from within a tokio runtime: timers and fetches are
    /// started with `tokio::spawn`, which panics outside one.
    pub fn dispatch(&mut self, event: SearchEvent) -> Option<CitySuggestion> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, event);
        self.state = state;

        let mut selected = None;
        for effect in effects {
            match effect {
                SearchEffect::StartDebounce { token, delay } => {
                    if let Some(previous) = self.debounce_task.take() {
                        previous.abort();
                    }
                    self.debounce_task = Some(self.schedule(delay, SearchEvent::TimerFired(token)));
                }
                SearchEffect::StartBlurGrace { token, delay } => {
                    self.schedule(delay, SearchEvent::BlurGraceElapsed(token));
                }
                SearchEffect::FetchSuggestions { request, query } => {
                    let source = Arc::clone(&self.source);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = source.search_cities(&query).await.map_err(|e| e.to_string());
                        // The receiver only goes away with the session.
                        let _ = tx.send(SearchEvent::FetchCompleted { request, result });
                    });
                }
                SearchEffect::Notify(notification) => self.sink.notify(notification),
                SearchEffect::Selected(city) => selected = Some(city),
            }
        }

        selected
    }

    fn schedule(&self, delay: Duration, event: SearchEvent) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        })
    }

    /// Wait for the next timer or fetch outcome and apply it.
    ///
    /// Returns `false` without waiting when nothing is outstanding.
    pub async fn step(&mut self) -> bool {
        if !self.state.is_waiting() {
            return false;
        }

        match self.rx.recv().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Run until no timer or current request is outstanding.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    /// Apply every event that has already arrived, without waiting.
    pub fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
        }
    }
}
