mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use common::{mock_db, postgres_statement, response_json, row, MockRow, TestApp};
use sea_orm::DbErr;
use serde_json::json;
use sigab_api::{
    models::notification::{HISTORY_LIMIT, INSTALLED_AT_REQUIRED_MESSAGE},
    services::notifications::{COUNT_VALID_FLOOD_REPORTS_SQL, NOTIFICATION_HISTORY_SQL},
};

fn count_row(total: i64) -> Vec<MockRow> {
    vec![row([("total", total.into())])]
}

#[tokio::test]
async fn three_valid_reports_trigger_an_alert() {
    let app = TestApp::new(mock_db().append_query_results([count_row(3)]));

    let response = app.get("/api/app/notifikasi/cek-banjir").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(
        body["data"],
        json!({ "total_valid_reports": 3, "should_notify": true })
    );

    assert_eq!(
        app.statements(),
        vec![postgres_statement(
            COUNT_VALID_FLOOD_REPORTS_SQL,
            ["Banjir".into(), "Valid".into()]
        )]
    );
}

#[tokio::test]
async fn two_valid_reports_stay_quiet() {
    let app = TestApp::new(mock_db().append_query_results([count_row(2)]));

    let body = response_json(app.get("/api/app/notifikasi/cek-banjir").await).await;

    assert_eq!(body["data"]["total_valid_reports"], 2);
    assert_eq!(body["data"]["should_notify"], false);
}

#[tokio::test]
async fn count_failure_is_a_server_error() {
    let app = TestApp::new(
        mock_db().append_query_errors([DbErr::Custom("connection reset".into())]),
    );

    let response = app.get("/api/app/notifikasi/cek-banjir").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "Terjadi kesalahan saat mengecek laporan banjir"
    );
}

#[tokio::test]
async fn notifications_are_listed() {
    let app = TestApp::new(mock_db().append_query_results([vec![
        row([
            ("id_notifikasi", 2i32.into()),
            ("judul", "Siaga 1".into()),
            ("pesan", "Ketinggian air naik".into()),
        ]),
        row([
            ("id_notifikasi", 1i32.into()),
            ("judul", "Waspada".into()),
            ("pesan", "Hujan deras".into()),
        ]),
    ]]));

    let response = app.get("/api/app/notifikasi").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let data = body["data"].as_array().expect("array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id_notifikasi"], 2);
    assert_eq!(data[1]["judul"], "Waspada");
}

#[tokio::test]
async fn empty_notification_table_yields_empty_array() {
    let app = TestApp::new(mock_db().append_query_results([Vec::<MockRow>::new()]));

    let body = response_json(app.get("/api/app/notifikasi").await).await;

    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn history_requires_installation_timestamp() {
    let app = TestApp::new(mock_db());

    for path in [
        "/api/app/notifikasi/history",
        "/api/app/notifikasi/history?installed_at=",
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        let body = response_json(response).await;
        assert_eq!(body["message"], INSTALLED_AT_REQUIRED_MESSAGE);
    }

    let response = app
        .get("/api/app/notifikasi/history?installed_at=kemarin")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.statements().is_empty());
}

#[tokio::test]
async fn history_is_bounded_by_installation_time() {
    let app = TestApp::new(mock_db().append_query_results([vec![row([
        ("id_notifikasi", 9i32.into()),
        ("judul", "Siaga 2".into()),
    ])]]));

    let response = app
        .get("/api/app/notifikasi/history?installed_at=2024-03-01T00:00:00Z")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"][0]["id_notifikasi"], 9);

    let installed_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    assert_eq!(
        app.statements(),
        vec![postgres_statement(
            NOTIFICATION_HISTORY_SQL,
            [installed_at.into(), HISTORY_LIMIT.into()]
        )]
    );
}
