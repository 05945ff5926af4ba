use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use sea_orm::JsonValue;

use crate::{
    errors::ServiceError,
    models::{
        notification::{FloodReportSummary, NotificationHistoryQuery},
        ApiResponse,
    },
    AppState,
};

async fn list_notifications(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<JsonValue>>>, ServiceError> {
    let notifications = state.services.notifications.list_notifications().await?;
    Ok(Json(ApiResponse::success(notifications)))
}

async fn check_flood_reports(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FloodReportSummary>>, ServiceError> {
    let summary = state.services.notifications.check_flood_reports().await?;
    Ok(Json(ApiResponse::success(summary)))
}

async fn notification_history(
    State(state): State<AppState>,
    Query(query): Query<NotificationHistoryQuery>,
) -> Result<Json<ApiResponse<Vec<JsonValue>>>, ServiceError> {
    let installed_at = query.installed_at()?;
    let history = state
        .services
        .notifications
        .notification_history(installed_at)
        .await?;
    Ok(Json(ApiResponse::success(history)))
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifikasi", get(list_notifications))
        .route("/notifikasi/cek-banjir", get(check_flood_reports))
        .route("/notifikasi/history", get(notification_history))
}
