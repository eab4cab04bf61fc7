use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::WeatherReport;

pub mod openweather;

/// Recoverable fetch failures, surfaced to the user as inline notifications.
///
/// A non-success status keeps the provider's own message text: the status
/// field can encode rate limiting or a rejected key, not just an unknown city.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Provider error {cod}: {message}")]
    Provider { cod: String, message: String },

    #[error("Error fetching data: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Error fetching data: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

/// A source of 5-day forecasts, keyed by free-text city name.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Exactly one attempt per invocation: no retry, no caching. Either the
    /// full report or a recoverable error.
    async fn fetch(&self, city: &str) -> Result<WeatherReport, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_keeps_upstream_message() {
        let err = FetchError::Provider {
            cod: "404".to_string(),
            message: "city not found".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("city not found"));
    }

    #[test]
    fn parse_error_uses_fetch_prefix() {
        let err = FetchError::Parse("missing field `list`".to_string());
        assert!(err.to_string().starts_with("Error fetching data:"));
    }
}
