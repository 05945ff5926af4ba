#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Transaction, Value};
use serde_json::Value as Json;
use sigab_api::{config::AppConfig, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str =
    "k3P9vQz2Lm8Rt6Yw1Xc4Nb7Hd0Fs5Gj2Aa9Ee3Ii7Oo1Uu5Kk8Ll2Mm6Nn0Pp4Qq8Rr";

pub const BOUNDARY: &str = "sigab-test-boundary";

pub type MockRow = BTreeMap<&'static str, Value>;

/// Application wired against a mock Postgres connection and a scratch upload directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    db: Arc<DatabaseConnection>,
    uploads: TempDir,
}

impl TestApp {
    pub fn new(mock: MockDatabase) -> Self {
        Self::with_config(mock, |_| {})
    }

    pub fn with_config(mock: MockDatabase, tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let uploads = tempfile::tempdir().expect("temp upload dir");

        let mut cfg = AppConfig::new(
            "postgres://localhost/sigab_test".to_string(),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            3000,
            "test".to_string(),
        );
        cfg.upload_dir = uploads.path().to_string_lossy().into_owned();
        tweak(&mut cfg);

        let db = Arc::new(mock.into_connection());
        let state = AppState::new(db.clone(), cfg).expect("app state");
        let router = sigab_api::app(state.clone());

        Self {
            router,
            state,
            db,
            uploads,
        }
    }

    /// Bearer token for a user the auth layer will accept.
    pub fn token_for(&self, id_user: i32) -> String {
        self.state
            .auth
            .generate_token(id_user, "Budi Santoso", "budi@example.com")
            .expect("token")
            .token
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.send(
            Request::builder()
                .method(Method::GET)
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, path: &str, body: Json, token: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        form: MultipartForm,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(form.finish())).unwrap())
            .await
    }

    /// Files currently sitting in the upload directory.
    pub fn uploaded_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.uploads.path())
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }

    /// Every statement the app sent to the mock database, in order.
    ///
    /// Consumes the app: the log can only be taken once the router and
    /// services have released their handles on the connection.
    pub fn statements(self) -> Vec<Transaction> {
        let Self {
            router,
            state,
            db,
            uploads,
        } = self;
        drop(router);
        drop(state);
        drop(uploads);

        Arc::try_unwrap(db)
            .unwrap_or_else(|_| panic!("mock connection still shared"))
            .into_transaction_log()
    }
}

pub fn mock_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

pub fn row<const N: usize>(columns: [(&'static str, Value); N]) -> MockRow {
    columns.into_iter().collect()
}

pub fn postgres_statement<I>(sql: &str, values: I) -> Transaction
where
    I: IntoIterator<Item = Value>,
{
    Transaction::from_sql_and_values(DatabaseBackend::Postgres, sql, values)
}

pub async fn response_json(response: Response) -> Json {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// A complete report form with a small JPEG attached.
pub fn report_form(titik_lokasi: &str) -> MultipartForm {
    MultipartForm::new()
        .text("id_user", "1")
        .text("tipe_laporan", "Banjir")
        .text("lokasi", "Jl. Sudirman, Jakarta")
        .text("titik_lokasi", titik_lokasi)
        .text("waktu", "2024-01-15T08:30:00Z")
        .text("deskripsi", "Air setinggi lutut")
        .file("foto", "banjir.jpg", "image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
}
