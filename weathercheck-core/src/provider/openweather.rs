use chrono::{DateTime, Duration, Local};
use reqwest::Client;
use serde::{Deserialize, Deserializer};

use super::{FetchError, ForecastProvider};
use crate::model::{CurrentWeather, ForecastEntry, WeatherReport};
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";
const ICON_URL_BASE: &str = "http://openweathermap.org/img/wn";

/// The provider returns 3-hourly buckets, so every 8th entry is one day apart.
const DAY_STRIDE: usize = 8;
const FORECAST_DAYS: usize = 5;

/// OpenWeatherMap 5-day forecast client.
///
/// Entry 0 of the forecast list doubles as "current" conditions; the daily
/// forecast samples entries 0, 8, 16, 24 and 32. Both conventions come from
/// the shape of this specific endpoint and are kept literal here.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host. Used by tests to target a local
    /// mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url,
        }
    }

    async fn fetch_forecast(&self, city: &str) -> Result<WeatherReport, FetchError> {
        let url = format!("{}/data/2.5/forecast", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        // The interesting status lives in the body's `cod` field, not the
        // HTTP status line; error payloads still carry a JSON body.
        let body = res.text().await?;

        let status: OwStatus = serde_json::from_str(&body)?;
        if status.cod != "200" {
            return Err(FetchError::Provider {
                cod: status.cod,
                message: status
                    .message
                    .unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body)?;
        build_report(&parsed, Local::now())
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    async fn fetch(&self, city: &str) -> Result<WeatherReport, FetchError> {
        tracing::debug!(%city, "requesting 5-day forecast");
        let report = self.fetch_forecast(city).await;
        match &report {
            Ok(r) => tracing::debug!(city = %r.current.city, "forecast fetched"),
            Err(e) => tracing::debug!(error = %e, "forecast fetch failed"),
        }
        report
    }
}

/// Project the raw payload into the report pair. `now` anchors the forecast
/// dates (today + one day per 8-entry stride).
fn build_report(
    payload: &OwForecastResponse,
    now: DateTime<Local>,
) -> Result<WeatherReport, FetchError> {
    let first = entry_at(payload, 0)?;
    let condition = first_condition(first)?;

    let current = CurrentWeather {
        city: payload.city.name.clone(),
        temperature: first.main.temp,
        description: capitalize(&condition.description),
        humidity: first.main.humidity,
        wind_speed: first.wind.speed,
        pressure: first.main.pressure,
        icon: icon_url(&condition.icon),
        latitude: payload.city.coord.lat,
        longitude: payload.city.coord.lon,
        sunrise: local_time_of_day(payload.city.sunrise)?,
        sunset: local_time_of_day(payload.city.sunset)?,
    };

    let mut forecast = Vec::with_capacity(FORECAST_DAYS);
    for day in 0..FORECAST_DAYS {
        let index = day * DAY_STRIDE;
        let entry = entry_at(payload, index)?;
        let condition = first_condition(entry)?;

        forecast.push(ForecastEntry {
            date: (now + Duration::days(day as i64))
                .format("%Y-%m-%d")
                .to_string(),
            temp: entry.main.temp,
            description: capitalize(&condition.description),
            icon: icon_url(&condition.icon),
        });
    }

    Ok(WeatherReport { current, forecast })
}

fn entry_at<'a>(
    payload: &'a OwForecastResponse,
    index: usize,
) -> Result<&'a OwForecastEntry, FetchError> {
    payload.list.get(index).ok_or_else(|| {
        FetchError::Parse(format!("forecast list has no entry at index {index}"))
    })
}

fn first_condition(entry: &OwForecastEntry) -> Result<&OwCondition, FetchError> {
    entry
        .weather
        .first()
        .ok_or_else(|| FetchError::Parse("forecast entry has no weather condition".to_string()))
}

fn icon_url(code: &str) -> String {
    format!("{ICON_URL_BASE}/{code}@2x.png")
}

/// Upper-case the first character, leave the rest untouched.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Unix seconds to a zero-padded local `HH:MM:SS` string.
fn local_time_of_day(ts: i64) -> Result<String, FetchError> {
    let utc = DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| FetchError::Parse(format!("timestamp {ts} out of range")))?;

    Ok(utc.with_timezone(&Local).format("%H:%M:%S").to_string())
}

/// Minimal envelope parsed before the full payload: the provider sends `cod`
/// as a string on success and as a number on some error responses.
#[derive(Debug, Deserialize)]
struct OwStatus {
    #[serde(deserialize_with = "string_or_number")]
    cod: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringOrNumber::deserialize(deserializer)?.into_string())
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(StringOrNumber::into_string))
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    coord: OwCoord,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    main: OwMain,
    weather: Vec<OwCondition>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}
