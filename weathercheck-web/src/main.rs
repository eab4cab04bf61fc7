//! Binary crate for the Weather Check dashboard.
//!
//! This crate focuses on:
//! - Serving the single dashboard page
//! - Rendering fetched weather into HTML fragments
//! - Surfacing fetch failures as inline notifications

use std::env;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing_subscriber::EnvFilter;
use weathercheck_core::{Config, ForecastProvider, OpenWeatherProvider};

mod handlers;
mod render;

const BIND_ENV: &str = "WEATHERCHECK_BIND";
const PORT_ENV: &str = "WEATHERCHECK_PORT";

const DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// Shared per-worker state: the provider and the credential the map overlay
/// reuses. Read-only for the lifetime of the process.
pub struct AppState {
    pub provider: Arc<dyn ForecastProvider>,
    pub api_key: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api_key = Config::resolve_api_key()
        .context("Failed to resolve provider credential")?
        .unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!("no API key configured; forecast requests will be rejected upstream");
    }

    let bind_address = env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let bind_port = env::var(PORT_ENV)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let state = web::Data::new(AppState {
        provider: Arc::new(OpenWeatherProvider::new(api_key.clone())),
        api_key,
    });

    tracing::info!(%bind_address, bind_port, "starting web server");
    HttpServer::new(move || App::new().app_data(state.clone()).service(handlers::index))
        .bind((bind_address.as_str(), bind_port))?
        .run()
        .await?;

    Ok(())
}
