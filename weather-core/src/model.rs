use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::{Icon, resolve_icon};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// The `q` parameter form understood by WeatherAPI, e.g. `52.52,13.4`.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

/// A candidate city returned by the autocomplete endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl CitySuggestion {
    /// Text placed in the search input once this suggestion is picked.
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lon: self.lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub localtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub condition_code: u32,
    pub condition_text: String,
    pub is_day: bool,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub vis_km: f64,
    pub cloud_pct: u8,
    pub uv: f64,
    pub precip_mm: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    pub condition_code: u32,
    pub condition_text: String,
    pub chance_of_rain_pct: u8,
    pub max_wind_kph: f64,
    pub sunrise: String,
    pub sunset: String,
}

/// Current conditions plus the daily forecast for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    pub days: Vec<DailyForecast>,
}

impl WeatherSnapshot {
    pub fn today(&self) -> Option<&DailyForecast> {
        self.days.first()
    }

    /// Icon for the current conditions, taken straight from the reported
    /// condition code and day/night flag.
    pub fn current_icon(&self) -> Icon {
        resolve_icon(self.current.condition_code, self.current.is_day)
    }
}

/// Outcome of a weather lookup, ready to render.
///
/// Failures carry a message instead of an error value so callers can show
/// them in place of the data view without matching on error kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherView {
    Ready { snapshot: Box<WeatherSnapshot>, icon: Icon },
    Failed { message: String },
}

impl WeatherView {
    pub fn from_snapshot(snapshot: WeatherSnapshot) -> Self {
        let icon = snapshot.current_icon();
        WeatherView::Ready { snapshot: Box::new(snapshot), icon }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, WeatherView::Ready { .. })
    }
}
