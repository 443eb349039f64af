use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use weather_core::{
    CitySuggestion, Config, NotificationSink, SearchEvent, SearchSession, WeatherApiProvider,
    WeatherView, lookup_weather, resolve_icon,
};

use crate::output::{self, TerminalSink};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key in the config file.
    Configure,

    /// List cities matching a search text.
    Search {
        /// City name or prefix (at least 3 characters).
        text: String,
    },

    /// Show current weather and forecast for a city.
    Show {
        /// City name or prefix (at least 3 characters).
        text: String,

        /// Pick the N-th suggestion (1-based) instead of asking.
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Print the icon name for a condition code.
    Icon {
        code: u32,

        /// Resolve the night variant.
        #[arg(long)]
        night: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { text } => {
                let (_, mut session) = start_session()?;
                let cities = search(&mut session, &text).await;
                output::print_suggestions(&cities);
                Ok(())
            }
            Command::Show { text, pick } => show(&text, pick).await,
            Command::Icon { code, night } => {
                println!("{}", resolve_icon(code, !night));
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("WeatherAPI.com key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(key);
    config.save()?;

    println!("Saved config to {}", Config::config_file_path()?.display());
    Ok(())
}

fn start_session() -> anyhow::Result<(Arc<WeatherApiProvider>, SearchSession)> {
    let config = Config::load()?.with_env_overrides();
    let sink = Arc::new(TerminalSink);

    if let Some(notice) = config.credential_notice() {
        sink.notify(notice);
    }

    let provider = Arc::new(WeatherApiProvider::from_config(&config));
    let session = SearchSession::new(config.search, provider.clone(), sink);
    Ok((provider, session))
}

/// Feed `text` into the search box keystroke by keystroke and wait for the
/// debounced lookup to finish.
async fn search(session: &mut SearchSession, text: &str) -> Vec<CitySuggestion> {
    let mut typed = String::with_capacity(text.len());
    session.dispatch(SearchEvent::Focused);
    for ch in text.chars() {
        typed.push(ch);
        session.dispatch(SearchEvent::InputChanged(typed.clone()));
    }
    session.settle().await;

    session.state().suggestions().to_vec()
}

async fn show(text: &str, pick: Option<usize>) -> anyhow::Result<()> {
    let (provider, mut session) = start_session()?;
    let cities = search(&mut session, text).await;

    if cities.is_empty() {
        bail!("No cities found for '{text}'");
    }

    let index = match pick {
        Some(n) if (1..=cities.len()).contains(&n) => n - 1,
        Some(n) => bail!("--pick {n} is out of range, {} suggestion(s) available", cities.len()),
        None => prompt_city(&cities)?,
    };

    tracing::debug!(index, count = cities.len(), "picking suggestion");
    let Some(city) = session.dispatch(SearchEvent::SuggestionSelected(index)) else {
        bail!("Suggestion {} could not be selected", index + 1);
    };

    tracing::debug!(city = %city.label(), lat = city.lat, lon = city.lon, "fetching weather");
    let view = lookup_weather(provider.as_ref(), &city).await;
    output::print_weather(&city, &view);
    ensure_ready(&city, &view)
}

/// Turn a failed view into an error so the process exits non-zero.
fn ensure_ready(city: &CitySuggestion, view: &WeatherView) -> anyhow::Result<()> {
    match view {
        WeatherView::Ready { .. } => Ok(()),
        WeatherView::Failed { message } => {
            tracing::debug!(city = %city.label(), %message, "weather lookup failed");
            bail!("Weather lookup for {} failed", city.label())
        }
    }
}

fn prompt_city(cities: &[CitySuggestion]) -> anyhow::Result<usize> {
    if cities.len() == 1 {
        return Ok(0);
    }

    let options: Vec<String> =
        cities.iter().enumerate().map(|(i, c)| format!("{}. {}", i + 1, output::describe_city(c))).collect();

    let chosen = Select::new("Which city?", options.clone())
        .prompt()
        .context("Failed to read city selection")?;

    options.iter().position(|o| *o == chosen).context("Selection not in list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::Icon;

    fn madrid() -> CitySuggestion {
        CitySuggestion {
            id: 3,
            name: "Madrid".into(),
            region: String::new(),
            country: "Spain".into(),
            lat: 40.4,
            lon: -3.68,
        }
    }

    #[test]
    fn failed_view_is_an_error() {
        let view = WeatherView::Failed { message: "No matching location found.".into() };
        let err = ensure_ready(&madrid(), &view).unwrap_err();
        assert!(err.to_string().contains("Madrid, Spain"));
    }

    #[test]
    fn cli_parses_show_with_pick() {
        let cli = Cli::try_parse_from(["weather", "show", "Berlin", "--pick", "2"]).expect("valid args");
        match cli.command {
            Command::Show { text, pick } => {
                assert_eq!(text, "Berlin");
                assert_eq!(pick, Some(2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn icon_command_defaults_to_day() {
        let cli = Cli::try_parse_from(["weather", "icon", "1000"]).expect("valid args");
        assert!(matches!(cli.command, Command::Icon { code: 1000, night: false }));
        assert_eq!(resolve_icon(1000, true), Icon::Sun);
    }
}
