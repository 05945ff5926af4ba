use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;

use crate::{
    errors::{ResultExt, ServiceError},
    models::ApiResponse,
    AppState,
};

async fn current_weather(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, ServiceError> {
    let forecast = state
        .services
        .weather
        .current_forecast()
        .await
        .or_internal("Terjadi kesalahan saat mengambil data cuaca")?;
    Ok(Json(ApiResponse::success(forecast)))
}

pub fn weather_routes() -> Router<AppState> {
    Router::new().route("/cuaca", get(current_weather))
}
