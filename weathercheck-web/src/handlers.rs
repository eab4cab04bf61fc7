use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;

use crate::AppState;
use crate::render::{self, PageState};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub city: Option<String>,
}

/// The single dashboard route. Without a `city` parameter this is the idle
/// page; with one, the forecast is fetched inline and the outcome rendered
/// into the same page. One fetch per request, awaited before responding.
#[get("/")]
pub async fn index(state: web::Data<AppState>, query: web::Query<PageQuery>) -> impl Responder {
    let page_state = match query.into_inner().city {
        None => PageState::Idle,
        Some(city) if city.trim().is_empty() => PageState::EmptyCity { city },
        Some(city) => match state.provider.fetch(&city).await {
            Ok(report) => {
                tracing::info!(city = %report.current.city, "forecast rendered");
                PageState::Report { city, report }
            }
            Err(err) => {
                tracing::warn!(%city, error = %err, "forecast fetch failed");
                PageState::Failed {
                    city,
                    message: err.to_string(),
                }
            }
        },
    };

    let body = render::page(&page_state, &state.api_key);

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}
