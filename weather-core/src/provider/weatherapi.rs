use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::Config,
    error::WeatherError,
    model::{
        CitySuggestion, Coordinates, CurrentConditions, DailyForecast, Location, WeatherSnapshot,
    },
};

use super::{SuggestionSource, WeatherSource};

/// Client for WeatherAPI.com. Speeds are reported in kph as the service sends them.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: Option<String>,
    base_url: String,
    forecast_days: u8,
    http: Client,
}

impl WeatherApiProvider {
    /// Build a client from config. A missing key is not an error here; every
    /// lookup reports [`WeatherError::MissingApiKey`] instead.
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.api_key().map(str::to_owned),
            base_url: config.base_url().to_owned(),
            forecast_days: config.forecast_days(),
            http: Client::new(),
        }
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<(u16, String), WeatherError> {
        let key = self.api_key()?;
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self.http.get(&url).query(&[("key", key)]).query(query).send().await?;

        let status = res.status().as_u16();
        let body = res.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl SuggestionSource for WeatherApiProvider {
    async fn search_cities(&self, query: &str) -> Result<Vec<CitySuggestion>, WeatherError> {
        let (status, body) = self.get("search.json", &[("q", query)]).await?;
        parse_search(status, &body)
    }
}

#[async_trait]
impl WeatherSource for WeatherApiProvider {
    async fn fetch_weather(&self, at: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let q = at.to_query();
        let days = self.forecast_days.to_string();
        let (status, body) = self
            .get("forecast.json", &[("q", &q), ("days", &days), ("aqi", "no"), ("alerts", "no")])
            .await?;
        parse_forecast(status, &body)
    }
}

pub(crate) fn parse_search(status: u16, body: &str) -> Result<Vec<CitySuggestion>, WeatherError> {
    decode(status, body)
}

pub(crate) fn parse_forecast(status: u16, body: &str) -> Result<WeatherSnapshot, WeatherError> {
    let parsed: WaForecastResponse = decode(status, body)?;
    Ok(parsed.into())
}

fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, WeatherError> {
    if !(200..300).contains(&status) {
        if let Ok(envelope) = serde_json::from_str::<WaErrorEnvelope>(body) {
            return Err(WeatherError::Service {
                code: envelope.error.code,
                message: envelope.error.message,
            });
        }

        return Err(WeatherError::Status { status, body: truncate_body(body) });
    }

    Ok(serde_json::from_str(body)?)
}

#[derive(Debug, Deserialize)]
struct WaErrorEnvelope {
    error: WaError,
}

#[derive(Debug, Deserialize)]
struct WaError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    country: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    last_updated_epoch: Option<i64>,
    temp_c: f64,
    feelslike_c: f64,
    is_day: u8,
    condition: WaCondition,
    humidity: u8,
    wind_kph: f64,
    #[serde(default)]
    wind_dir: String,
    pressure_mb: f64,
    vis_km: f64,
    cloud: u8,
    #[serde(default)]
    uv: f64,
    #[serde(default)]
    precip_mm: f64,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    #[serde(default)]
    maxwind_kph: f64,
    #[serde(default)]
    daily_chance_of_rain: u8,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
    astro: WaAstro,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

impl From<WaForecastResponse> for WeatherSnapshot {
    fn from(parsed: WaForecastResponse) -> Self {
        let WaForecastResponse { location, current, forecast } = parsed;

        let last_updated =
            current.last_updated_epoch.and_then(unix_to_utc).unwrap_or_else(Utc::now);

        let days = forecast
            .forecastday
            .into_iter()
            .map(|fd| DailyForecast {
                date: fd.date,
                min_temp_c: fd.day.mintemp_c,
                max_temp_c: fd.day.maxtemp_c,
                condition_code: fd.day.condition.code,
                condition_text: fd.day.condition.text,
                chance_of_rain_pct: fd.day.daily_chance_of_rain,
                max_wind_kph: fd.day.maxwind_kph,
                sunrise: fd.astro.sunrise,
                sunset: fd.astro.sunset,
            })
            .collect();

        WeatherSnapshot {
            location: Location {
                name: location.name,
                region: location.region,
                country: location.country,
                lat: location.lat,
                lon: location.lon,
                localtime: location.localtime,
            },
            current: CurrentConditions {
                condition_code: current.condition.code,
                condition_text: current.condition.text,
                is_day: current.is_day != 0,
                temp_c: current.temp_c,
                feels_like_c: current.feelslike_c,
                humidity_pct: current.humidity,
                wind_kph: current.wind_kph,
                wind_dir: current.wind_dir,
                pressure_mb: current.pressure_mb,
                vis_km: current.vis_km,
                cloud_pct: current.cloud,
                uv: current.uv,
                precip_mm: current.precip_mm,
                last_updated,
            },
            days,
        }
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SEARCH_BODY: &str = r#"[
        {"id":2801268,"name":"London","region":"City of London, Greater London","country":"United Kingdom","lat":51.52,"lon":-0.11,"url":"london-city-of-london-greater-london-united-kingdom"},
        {"id":2796590,"name":"Holborn","region":"Camden, Greater London","country":"United Kingdom","lat":51.52,"lon":-0.12,"url":"holborn-camden-greater-london-united-kingdom"}
    ]"#;

    const FORECAST_BODY: &str = r#"{
        "location": {"name":"Berlin","region":"Berlin","country":"Germany","lat":52.52,"lon":13.4,"tz_id":"Europe/Berlin","localtime_epoch":1760554800,"localtime":"2026-10-15 21:00"},
        "current": {
            "last_updated_epoch":1760554800,"last_updated":"2026-10-15 21:00",
            "temp_c":11.2,"is_day":0,
            "condition":{"text":"Partly cloudy","icon":"//cdn.weatherapi.com/weather/64x64/night/116.png","code":1003},
            "wind_kph":14.4,"wind_degree":250,"wind_dir":"WSW","pressure_mb":1016.0,"precip_mm":0.0,
            "humidity":71,"cloud":50,"feelslike_c":9.6,"vis_km":10.0,"uv":0.0,"gust_kph":22.1
        },
        "forecast": {"forecastday": [
            {"date":"2026-10-15","date_epoch":1760486400,
             "day":{"maxtemp_c":14.1,"mintemp_c":7.3,"avgtemp_c":10.4,"maxwind_kph":18.0,"totalprecip_mm":0.2,"avghumidity":78,"daily_chance_of_rain":20,"condition":{"text":"Patchy rain nearby","icon":"","code":1063},"uv":2.0},
             "astro":{"sunrise":"07:31 AM","sunset":"06:17 PM","moonrise":"03:12 AM","moonset":"05:01 PM"}},
            {"date":"2026-10-16","date_epoch":1760572800,
             "day":{"maxtemp_c":12.0,"mintemp_c":6.0,"maxwind_kph":25.2,"daily_chance_of_rain":85,"condition":{"text":"Moderate rain","icon":"","code":1189}},
             "astro":{"sunrise":"07:33 AM","sunset":"06:15 PM"}}
        ]}
    }"#;

    #[test]
    fn parses_search_results_in_order() {
        let cities = parse_search(200, SEARCH_BODY).expect("search body must parse");

        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name, "London");
        assert_eq!(cities[0].label(), "London, United Kingdom");
        assert_eq!(cities[1].id, 2796590);
        assert_eq!(cities[1].coordinates(), Coordinates { lat: 51.52, lon: -0.12 });
    }

    #[test]
    fn empty_search_result_is_ok() {
        let cities = parse_search(200, "[]").expect("empty array must parse");
        assert!(cities.is_empty());
    }

    #[test]
    fn parses_forecast_without_unit_conversion() {
        let snap = parse_forecast(200, FORECAST_BODY).expect("forecast body must parse");

        assert_eq!(snap.location.name, "Berlin");
        assert_eq!(snap.location.country, "Germany");
        assert_eq!(snap.current.condition_code, 1003);
        assert!(!snap.current.is_day);
        assert_eq!(snap.current.wind_kph, 14.4);
        assert_eq!(snap.current.humidity_pct, 71);
        assert_eq!(snap.current.last_updated.timestamp(), 1760554800);

        let today = snap.today().expect("first forecast day");
        assert_eq!(today.date, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert_eq!(today.min_temp_c, 7.3);
        assert_eq!(today.max_temp_c, 14.1);
        assert_eq!(today.sunrise, "07:31 AM");
        assert_eq!(today.sunset, "06:17 PM");
        assert_eq!(snap.days[1].chance_of_rain_pct, 85);
    }

    #[test]
    fn structured_error_body_becomes_service_error() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        let err = parse_search(400, body).unwrap_err();

        assert_matches!(err, WeatherError::Service { code: 1006, ref message } if message == "No matching location found.");
    }

    #[test]
    fn unstructured_error_body_is_truncated() {
        let body = "é".repeat(300);
        let err = parse_forecast(502, &body).unwrap_err();

        assert_matches!(err, WeatherError::Status { status: 502, ref body } if body.ends_with("...") && body.len() <= 203);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_search(200, "{not json").unwrap_err();
        assert_matches!(err, WeatherError::Parse(_));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let provider = WeatherApiProvider::from_config(&Config::default());

        let err = provider.search_cities("Berlin").await.unwrap_err();
        assert_matches!(err, WeatherError::MissingApiKey);

        let err = provider.fetch_weather(Coordinates { lat: 1.0, lon: 2.0 }).await.unwrap_err();
        assert_matches!(err, WeatherError::MissingApiKey);
    }
}
