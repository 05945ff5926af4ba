pub mod notifications;
pub mod reports;
pub mod resources;
pub mod users;
pub mod weather;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    auth::AuthService,
    config::AppConfig,
    errors::{ResultExt, ServiceError},
    services::{
        notifications::NotificationService, photos::PhotoStore, reports::ReportService,
        resources::ResourceService, users::UserService, weather::WeatherService,
    },
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Debug, Clone)]
pub struct AppServices {
    pub reports: Arc<ReportService>,
    pub notifications: Arc<NotificationService>,
    pub resources: Arc<ResourceService>,
    pub weather: Arc<WeatherService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &AppConfig,
        auth: Arc<AuthService>,
    ) -> Result<Self, ServiceError> {
        let weather = WeatherService::new(
            config.weather_api_url.clone(),
            Duration::from_secs(config.weather_timeout_secs),
        )
        .or_internal("Gagal menyiapkan layanan cuaca")?;

        Ok(Self {
            reports: Arc::new(ReportService::new(
                db.clone(),
                PhotoStore::new(&config.upload_dir),
            )),
            notifications: Arc::new(NotificationService::new(db.clone())),
            resources: Arc::new(ResourceService::new(db.clone())),
            weather: Arc::new(weather),
            users: Arc::new(UserService::new(db, auth)),
        })
    }
}

/// Routes mounted under `/api/app`.
pub fn app_routes(config: &AppConfig) -> Router<AppState> {
    Router::new()
        .merge(resources::resource_routes())
        .merge(notifications::notification_routes())
        .merge(weather::weather_routes())
        .merge(reports::report_routes(config.upload_max_bytes))
}

/// Routes mounted under `/api/users`.
pub fn user_routes() -> Router<AppState> {
    users::user_routes()
}
