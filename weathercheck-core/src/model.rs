use serde::Serialize;

/// Conditions "now", approximated by the nearest 3-hour forecast bucket.
///
/// Every field is projected from entry 0 of the provider's forecast list.
/// Upstream values are displayed as-is; no range validation happens here.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentWeather {
    /// Display name as returned by the provider.
    pub city: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Human-readable condition, first character upper-cased.
    pub description: String,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Meters per second.
    pub wind_speed: f64,
    /// Hectopascal.
    pub pressure: f64,
    /// URL of the provider's condition icon.
    pub icon: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Local time of day, `HH:MM:SS`.
    pub sunrise: String,
    /// Local time of day, `HH:MM:SS`.
    pub sunset: String,
}

/// One sampled day of the 5-day forecast.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastEntry {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Degrees Celsius.
    pub temp: f64,
    /// Human-readable condition, first character upper-cased.
    pub description: String,
    /// URL of the provider's condition icon.
    pub icon: String,
}

/// The all-or-nothing result of one fetch: either both pieces exist or the
/// fetch failed as a whole. Constructed once per request, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastEntry>,
}
