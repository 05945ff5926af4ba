use async_trait::async_trait;
use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    routing::post,
    Form, Json, Router,
};
use bytes::BytesMut;
use tracing::debug;

use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ServiceError,
    models::{
        report::{
            PhotoUpload, RawReportFields, ReportCreated, ReportSubmission, REPORT_CREATED_MESSAGE,
        },
        ApiResponse,
    },
    AppState,
};

/// Extra room for the text fields that travel next to the photo.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

const PHOTO_FIELD: &str = "foto";

fn invalid_form() -> ServiceError {
    ServiceError::ValidationError("Data form tidak valid".to_string())
}

fn too_large(max_bytes: usize) -> ServiceError {
    ServiceError::ValidationError(format!(
        "Ukuran file maksimal {}MB",
        max_bytes / (1024 * 1024)
    ))
}

/// Report body in any of the accepted encodings. A photo part is checked
/// for type and size here and kept in memory.
#[async_trait]
impl FromRequest<AppState> for ReportSubmission {
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|_| invalid_form())?;
            return read_multipart(multipart, state.config.upload_max_bytes).await;
        }

        let fields = if content_type.starts_with("application/json") {
            let Json(fields) = Json::<RawReportFields>::from_request(req, state)
                .await
                .map_err(|_| invalid_form())?;
            fields
        } else {
            let Form(fields) = Form::<RawReportFields>::from_request(req, state)
                .await
                .map_err(|_| invalid_form())?;
            fields
        };

        Ok(ReportSubmission {
            fields,
            photo: None,
        })
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<ReportSubmission, ServiceError> {
    let mut submission = ReportSubmission::default();

    while let Some(mut field) = multipart.next_field().await.map_err(|_| invalid_form())? {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(file_name) if name == PHOTO_FIELD && !file_name.is_empty() => {
                // Reject by name before reading any bytes.
                let accepted = PhotoUpload::new(&file_name, Default::default())?;

                let mut buffer = BytesMut::new();
                while let Some(chunk) = field.chunk().await.map_err(|_| invalid_form())? {
                    if buffer.len() + chunk.len() > max_bytes {
                        return Err(too_large(max_bytes));
                    }
                    buffer.extend_from_slice(&chunk);
                }

                debug!(file_name = %file_name, bytes = buffer.len(), "Received report photo");
                submission.photo = Some(PhotoUpload {
                    bytes: buffer.freeze(),
                    ..accepted
                });
            }
            Some(_) => {
                // Stray file parts are drained and ignored.
                while field.chunk().await.map_err(|_| invalid_form())?.is_some() {}
            }
            None => {
                let value = field.text().await.map_err(|_| invalid_form())?;
                submission.fields.set(&name, value);
            }
        }
    }

    Ok(submission)
}

async fn create_report(
    State(state): State<AppState>,
    user: AuthUser,
    submission: ReportSubmission,
) -> Result<(StatusCode, Json<ApiResponse<ReportCreated>>), ServiceError> {
    debug!(authenticated_user = user.user_id, "Report submission received");
    let created = state.services.reports.create_report(submission).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            REPORT_CREATED_MESSAGE,
            created,
        )),
    ))
}

pub fn report_routes(upload_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/laporan", post(create_report))
        .layer(DefaultBodyLimit::max(upload_max_bytes + FORM_OVERHEAD_BYTES))
        .with_auth()
}
