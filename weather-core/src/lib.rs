//! Core library for the `weather` lookup tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The WeatherAPI.com client behind small source traits
//! - The debounced city search state machine and its tokio driver
//! - Condition-code to icon resolution
//!
//! It is used by `weather-cli`, but the search and icon logic carry no UI
//! assumptions and can back any front end.

pub mod condition;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod provider;
pub mod search;
pub mod session;

pub use condition::{ConditionIcon, Icon, resolve_icon};
pub use config::{Config, SearchSettings};
pub use error::WeatherError;
pub use model::{CitySuggestion, Coordinates, WeatherSnapshot, WeatherView};
pub use notify::{Notification, NotificationSink, Severity};
pub use provider::{SuggestionSource, WeatherApiProvider, WeatherSource, lookup_weather};
pub use search::{SearchEffect, SearchEvent, SearchState};
pub use session::SearchSession;
