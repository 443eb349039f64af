use thiserror::Error;

/// Errors produced by weather and city lookups.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(
        "No WeatherAPI key configured.\n\
         Hint: run `weather configure` or set WEATHERAPI_KEY."
    )]
    MissingApiKey,

    #[error("Failed to reach WeatherAPI: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("WeatherAPI request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse WeatherAPI response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("WeatherAPI error {code}: {message}")]
    Service { code: i64, message: String },
}
