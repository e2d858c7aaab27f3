use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use scraper_chromiumoxide::{scrape_page, PageRenderer};
use serde::Serialize;
use shared::constants::MISSING_URL_MESSAGE;
use shared::{CrawlRequest, CrawlResponse, ErrorResponse};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn PageRenderer>,
    pub max_text_length: usize,
}

impl AppState {
    pub fn new(renderer: Arc<dyn PageRenderer>, max_text_length: usize) -> Self {
        Self {
            renderer,
            max_text_length,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    ts: String,
}

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        ts: Utc::now().to_rfc3339(),
    })
}

pub async fn crawl_url(
    State(state): State<AppState>,
    payload: Result<Json<CrawlRequest>, JsonRejection>,
) -> Result<Json<CrawlResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(%rejection, "rejected crawl request body");
            return Err(missing_url());
        }
    };
    let Some(url) = request.target() else {
        return Err(missing_url());
    };

    info!(url, "crawl requested");
    match scrape_page(state.renderer.as_ref(), url, state.max_text_length).await {
        Ok(content) => {
            info!(url, chars = content.chars().count(), "crawl finished");
            Ok(Json(CrawlResponse { content }))
        }
        Err(e) => {
            error!(url, error = %e, "crawl failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::crawl_failed(url, e)),
            ))
        }
    }
}

fn missing_url() -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(MISSING_URL_MESSAGE)),
    )
}
