use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ServiceError,
    models::{
        user::{LoginRequest, LoginResponse, RegisterRequest, UserProfile},
        ApiResponse,
    },
    AppState,
};

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        info!(error = %rejection, "Rejected malformed JSON body");
        ServiceError::ValidationError("Format data tidak valid".to_string())
    })
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>), ServiceError> {
    let request = json_body(body)?;
    let profile = state.services.users.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Registrasi berhasil",
            profile,
        )),
    ))
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResponse>>, ServiceError> {
    let request = json_body(body)?;
    let session = state.services.users.login(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        "Login berhasil",
        session,
    )))
}

async fn logout(State(state): State<AppState>, user: AuthUser) -> Json<ApiResponse<()>> {
    state.services.users.logout(&user).await;
    Json(ApiResponse::message("Logout berhasil"))
}

async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserProfile>>, ServiceError> {
    let profile = state.services.users.profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

pub fn user_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/profile", get(profile))
        .with_auth();

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}
