//! SIGAB API Library
//!
//! Flood reporting backend for the SIGAB mobile app: citizen reports, flood
//! alerts, reference data and weather, served over a JSON REST API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, services::ServeDir,
};

use crate::errors::{ErrorResponse, GENERIC_SERVER_ERROR};
use crate::models::ApiResponse;

pub const WELCOME_MESSAGE: &str =
    "Selamat datang di API SIGAB (Sistem Informasi dan Kesiapsiagaan Banjir)";
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Endpoint tidak ditemukan";
pub const DATABASE_UNAVAILABLE_MESSAGE: &str = "Database tidak dapat dihubungi";

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub auth: Arc<auth::AuthService>,
}

impl AppState {
    /// Wires every service against one connection and config.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
    ) -> Result<Self, errors::ServiceError> {
        let auth = Arc::new(auth::AuthService::new(auth::AuthConfig::from(&config)));
        let services = handlers::AppServices::new(db.clone(), &config, auth.clone())?;
        Ok(Self {
            db,
            config,
            services,
            auth,
        })
    }
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

async fn health_check(State(state): State<AppState>) -> Response {
    health_response(db::check_connection(&state.db).await.is_ok())
}

fn health_response(database_healthy: bool) -> Response {
    if !database_healthy {
        return ErrorResponse::new(DATABASE_UNAVAILABLE_MESSAGE)
            .into_response_with(StatusCode::SERVICE_UNAVAILABLE);
    }

    let health_data = json!({
        "status": "healthy",
        "checks": { "database": "healthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "git": option_env!("GIT_HASH").unwrap_or("unknown"),
        "build_time": option_env!("BUILD_TIME").unwrap_or("unknown"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Json(ApiResponse::success(health_data)).into_response()
}

async fn route_not_found() -> Response {
    ErrorResponse::new(ROUTE_NOT_FOUND_MESSAGE).into_response_with(StatusCode::NOT_FOUND)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ::tracing::error!(panic = %detail, "Handler panicked");

    ErrorResponse::new(GENERIC_SERVER_ERROR).into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Application routes with state applied, without the outer service layers.
pub fn build_router(state: AppState) -> Router {
    let upload_dir = state.config.upload_dir.clone();

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .nest("/api/app", handlers::app_routes(&state.config))
        .nest("/api/users", handlers::user_routes())
        .nest_service(services::photos::PUBLIC_PREFIX, ServeDir::new(upload_dir))
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .with_state(state)
}

/// Request-wide layers: auth injection, compression, tracing, request ids and
/// panic recovery, from innermost to outermost.
pub fn with_service_layers(router: Router, auth: Arc<auth::AuthService>) -> Router {
    router
        .layer(Extension(auth))
        .layer(CompressionLayer::new())
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
}

/// Fully layered application, as served by the binary minus CORS.
pub fn app(state: AppState) -> Router {
    let auth = state.auth.clone();
    with_service_layers(build_router(state), auth)
}
