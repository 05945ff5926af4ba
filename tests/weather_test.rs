mod common;

use axum::http::StatusCode;
use common::{mock_db, response_json, TestApp};
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const FORECAST_PATH: &str = "/publik/prakiraan-cuaca";

async fn app_against(server: &MockServer) -> TestApp {
    let url = format!("{}{}", server.uri(), FORECAST_PATH);
    TestApp::with_config(mock_db(), move |cfg| {
        cfg.weather_api_url = url;
        cfg.weather_timeout_secs = 2;
    })
}

#[tokio::test]
async fn forecast_is_passed_through() {
    let server = MockServer::start().await;
    let forecast = json!({
        "lokasi": { "adm4": "31.71.03.1001", "kotkab": "Kota Adm. Jakarta Pusat" },
        "data": [{ "cuaca": [[{ "t": 29, "weather_desc": "Hujan Ringan" }]] }]
    });
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let response = app.get("/api/app/cuaca").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], forecast);
}

#[tokio::test]
async fn upstream_error_becomes_localized_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let response = app.get("/api/app/cuaca").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "Terjadi kesalahan saat mengambil data cuaca"
    );
}

#[tokio::test]
async fn non_json_payload_is_a_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let app = app_against(&server).await;
    let response = app.get("/api/app/cuaca").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
