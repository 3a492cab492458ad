#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for cyclist and pedestrian crash statistics.
//!
//! Serves the statistics document computed from the NYC motor vehicle
//! collisions dataset. The document is computed on the first request (or
//! at start-up with `--warm`) and then served from a 24 hour cache.

pub mod config;
mod handlers;
pub mod service;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crash_stats_source::socrata::SocrataCrashSource;

use crate::config::ServerConfig;
use crate::service::CrashStatsService;

/// Shared application state.
pub struct AppState {
    /// Cached statistics pipeline.
    pub stats: CrashStatsService,
}

/// Registers every route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/test", web::get().to(handlers::test_page))
        .route("/health", web::get().to(handlers::health))
        .route("/data", web::get().to(handlers::data));
}

/// Starts the crash stats API server.
///
/// Builds the Socrata source and the cached statistics service from
/// `config`, optionally computes the first result, and runs the Actix-Web
/// HTTP server. The caller is responsible for providing the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let source = Arc::new(SocrataCrashSource::new(config.socrata.clone()));
    log::info!(
        "Using collisions dataset at {} (page size {})",
        source.config().api_url,
        source.config().page_size
    );
    let stats = CrashStatsService::new(source, &config);

    if config.warm {
        log::info!("Warming statistics cache...");
        if let Err(e) = stats.data().await {
            log::error!("Cache warm-up failed, continuing without it: {e}");
        }
    }

    let state = web::Data::new(AppState { stats });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
