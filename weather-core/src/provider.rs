use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{CitySuggestion, Coordinates, WeatherSnapshot, WeatherView},
};

pub mod weatherapi;

pub use weatherapi::WeatherApiProvider;

/// Autocomplete lookup for city names.
#[async_trait]
pub trait SuggestionSource: Send + Sync + Debug {
    async fn search_cities(&self, query: &str) -> Result<Vec<CitySuggestion>, WeatherError>;
}

/// Current conditions and daily forecast for a coordinate pair.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_weather(&self, at: Coordinates) -> Result<WeatherSnapshot, WeatherError>;
}

/// Fetch weather for a picked city and fold any failure into a renderable view.
pub async fn lookup_weather<W>(source: &W, city: &CitySuggestion) -> WeatherView
where
    W: WeatherSource + ?Sized,
{
    let at = city.coordinates();
    tracing::debug!(city = %city.label(), query = %at.to_query(), "fetching weather");

    match source.fetch_weather(at).await {
        Ok(snapshot) => WeatherView::from_snapshot(snapshot),
        Err(err) => {
            tracing::warn!(city = %city.label(), error = %err, "weather lookup failed");
            WeatherView::Failed { message: err.to_string() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Icon;
    use crate::model::{CurrentConditions, Location};
    use assert_matches::assert_matches;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FakeWeather {
        fail_with: Option<String>,
        asked: Mutex<Vec<Coordinates>>,
    }

    #[async_trait]
    impl WeatherSource for FakeWeather {
        async fn fetch_weather(&self, at: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
            self.asked.lock().unwrap().push(at);
            if let Some(message) = &self.fail_with {
                return Err(WeatherError::Service { code: 1006, message: message.clone() });
            }
            Ok(snapshot(1003, false))
        }
    }

    fn snapshot(code: u32, is_day: bool) -> WeatherSnapshot {
        WeatherSnapshot {
            location: Location {
                name: "Berlin".into(),
                region: "Berlin".into(),
                country: "Germany".into(),
                lat: 52.52,
                lon: 13.4,
                localtime: "2026-10-15 21:00".into(),
            },
            current: CurrentConditions {
                condition_code: code,
                condition_text: "Partly cloudy".into(),
                is_day,
                temp_c: 11.0,
                feels_like_c: 9.5,
                humidity_pct: 71,
                wind_kph: 14.4,
                wind_dir: "WSW".into(),
                pressure_mb: 1016.0,
                vis_km: 10.0,
                cloud_pct: 50,
                uv: 0.0,
                precip_mm: 0.0,
                last_updated: Utc::now(),
            },
            days: Vec::new(),
        }
    }

    fn berlin() -> CitySuggestion {
        CitySuggestion {
            id: 1,
            name: "Berlin".into(),
            region: "Berlin".into(),
            country: "Germany".into(),
            lat: 52.52,
            lon: 13.4,
        }
    }

    #[tokio::test]
    async fn ready_view_carries_resolved_icon() {
        let source = FakeWeather::default();
        let view = lookup_weather(&source, &berlin()).await;

        assert_matches!(view, WeatherView::Ready { icon: Icon::CloudMoon, .. });
        assert_eq!(*source.asked.lock().unwrap(), vec![Coordinates { lat: 52.52, lon: 13.4 }]);
    }

    #[tokio::test]
    async fn failure_becomes_message() {
        let source = FakeWeather { fail_with: Some("No matching location found.".into()), ..Default::default() };
        let view = lookup_weather(&source, &berlin()).await;

        assert_matches!(view, WeatherView::Failed { ref message } if message.contains("No matching location found."));
        assert!(!view.is_ready());
    }
}
