use axum::{extract::State, routing::get, Json, Router};
use sea_orm::JsonValue;

use crate::{errors::ServiceError, models::ApiResponse, services::resources::Resource, AppState};

type ListResponse = Result<Json<ApiResponse<Vec<JsonValue>>>, ServiceError>;

async fn list(state: &AppState, resource: Resource) -> ListResponse {
    let rows = state.services.resources.list(resource).await?;
    Ok(Json(ApiResponse::success(rows)))
}

async fn mitigation_tips(State(state): State<AppState>) -> ListResponse {
    list(&state, Resource::MitigationTips).await
}

async fn flood_info(State(state): State<AppState>) -> ListResponse {
    list(&state, Resource::FloodInfo).await
}

async fn evacuation_places(State(state): State<AppState>) -> ListResponse {
    list(&state, Resource::EvacuationPlaces).await
}

async fn flood_history(State(state): State<AppState>) -> ListResponse {
    list(&state, Resource::FloodHistory).await
}

pub fn resource_routes() -> Router<AppState> {
    Router::new()
        .route("/tips-mitigasi", get(mitigation_tips))
        .route("/informasi-banjir", get(flood_info))
        .route("/tempat-evakuasi", get(evacuation_places))
        .route("/riwayat-banjir", get(flood_history))
}
