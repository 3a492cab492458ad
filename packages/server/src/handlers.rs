//! HTTP handler functions for the crash stats API.

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, web};
use crash_stats_server_models::{ApiCrashData, ApiError, ApiHealth};

use crate::AppState;

/// `GET /`
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body("<p>Hello, World!</p>")
}

/// `GET /test`
pub async fn test_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body("<p>test</p>")
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /data`
///
/// Returns the cyclist and pedestrian statistics document, recomputing it
/// if the cached copy has expired.
pub async fn data(state: web::Data<AppState>) -> HttpResponse {
    match state.stats.data().await {
        Ok(result) => HttpResponse::Ok().json(ApiCrashData::from(result.as_ref())),
        Err(e) => {
            log::error!("Failed to compute crash statistics: {e}");
            HttpResponse::build(e.status()).json(ApiError {
                error: e.to_string(),
                code: e.code().to_string(),
            })
        }
    }
}
