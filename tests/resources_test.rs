mod common;

use axum::http::StatusCode;
use common::{mock_db, response_json, row, MockRow, TestApp};
use sea_orm::DbErr;
use serde_json::json;

#[tokio::test]
async fn evacuation_places_are_returned_verbatim() {
    let app = TestApp::new(mock_db().append_query_results([vec![row([
        ("id_tempat", 1i32.into()),
        ("nama_tempat", "GOR Kampung Melayu".into()),
        ("kapasitas", 300i32.into()),
        ("latitude", (-6.2249f64).into()),
        ("longitude", 106.8661f64.into()),
    ])]]));

    let response = app.get("/api/app/tempat-evakuasi").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"][0]["nama_tempat"], "GOR Kampung Melayu");
    assert_eq!(body["data"][0]["kapasitas"], 300);
}

#[tokio::test]
async fn every_reference_list_answers_with_an_array() {
    let db = (0..4).fold(mock_db(), |db, _| {
        db.append_query_results([Vec::<MockRow>::new()])
    });
    let app = TestApp::new(db);

    for path in [
        "/api/app/tips-mitigasi",
        "/api/app/informasi-banjir",
        "/api/app/tempat-evakuasi",
        "/api/app/riwayat-banjir",
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        assert_eq!(response_json(response).await["data"], json!([]), "{path}");
    }

    assert_eq!(app.statements().len(), 4);
}

#[tokio::test]
async fn database_failure_uses_resource_specific_message() {
    let app = TestApp::new(mock_db().append_query_errors([DbErr::Custom("timeout".into())]));

    let response = app.get("/api/app/tips-mitigasi").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "Terjadi kesalahan saat mengambil data tips mitigasi"
    );
    assert!(body.get("data").is_none());
}
