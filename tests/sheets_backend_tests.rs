// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sheets backend against a local stand-in for the values API.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use gym_tracker::config::{SheetsConfig, SheetsCredentials};
use gym_tracker::db::{Cell, Collection, SheetsBackend, StorageBackend};
use gym_tracker::error::AppError;
use gym_tracker::models::Goal;
use gym_tracker::services::{BulkImporter, ImportTable, StudentRepository};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

mod common;

const TOKEN: &str = "test-token";

type Sheets = Arc<Mutex<HashMap<String, Vec<Vec<Value>>>>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", TOKEN).as_str())
}

fn sheet_name(range: &str) -> String {
    range.split('!').next().unwrap_or_default().to_string()
}

fn unknown_range(range: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        format!("{{\"error\":{{\"message\":\"Unable to parse range: {}\"}}}}", range),
    )
        .into_response()
}

async fn get_values(
    State(sheets): State<Sheets>,
    Path((_id, range)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let sheets = sheets.lock().unwrap();
    match sheets.get(&sheet_name(&range)) {
        Some(values) if values.is_empty() => Json(json!({ "range": range })).into_response(),
        Some(values) => Json(json!({ "range": range, "values": values })).into_response(),
        None => unknown_range(&range),
    }
}

async fn append_values(
    State(sheets): State<Sheets>,
    Path((_id, range)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(range) = range.strip_suffix(":append") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let rows: Vec<Vec<Value>> = serde_json::from_value(body["values"].clone()).unwrap();

    let mut sheets = sheets.lock().unwrap();
    match sheets.get_mut(&sheet_name(range)) {
        Some(values) => {
            values.extend(rows);
            Json(json!({ "updates": {} })).into_response()
        }
        None => unknown_range(range),
    }
}

/// Serve a fake spreadsheet with the given worksheets; returns its base URL.
async fn fake_sheets(worksheets: &[&str]) -> (String, Sheets) {
    let sheets: Sheets = Arc::new(Mutex::new(
        worksheets.iter().map(|w| (w.to_string(), Vec::new())).collect(),
    ));
    let app = Router::new()
        .route(
            "/v4/spreadsheets/{id}/values/{range}",
            get(get_values).post(append_values),
        )
        .with_state(sheets.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), sheets)
}

fn backend(api_base: &str, token: &str) -> SheetsBackend {
    SheetsBackend::new(&SheetsConfig {
        spreadsheet_id: "sheet-123".to_string(),
        api_base: api_base.to_string(),
        credentials: SheetsCredentials::AccessToken(token.to_string()),
    })
    .unwrap()
}

#[tokio::test]
async fn test_first_append_writes_header() {
    let (base, sheets) = fake_sheets(&["alumnos", "planes"]).await;
    let students = StudentRepository::new(backend(&base, TOKEN));

    let ana = students
        .create(common::new_student("Ana", Goal::Strength))
        .await
        .unwrap();
    let leo = students
        .create(common::new_student("Leo", Goal::WeightLoss))
        .await
        .unwrap();
    assert_eq!((ana.id, leo.id), (1, 2));

    {
        let sheets = sheets.lock().unwrap();
        let values = &sheets["alumnos"];
        assert_eq!(values.len(), 3);
        assert_eq!(values[0][0], json!("id"));
        assert_eq!(values[0][5], json!("fecha_ingreso"));
        assert_eq!(values[2][4], json!("Pérdida de Peso"));
    }

    let all = students.list_all().await.unwrap();
    assert_eq!(all, vec![ana, leo]);
}

#[tokio::test]
async fn test_reads_rows_written_by_hand() {
    let (base, sheets) = fake_sheets(&["alumnos", "planes"]).await;
    sheets.lock().unwrap().insert(
        "alumnos".to_string(),
        vec![
            vec![json!("id"), json!("nombre"), json!("edad"), json!("peso"), json!("objetivo"), json!("fecha_ingreso")],
            vec![json!(4), json!("Ana"), json!(28), json!("61,5"), json!("Fuerza"), json!("2024-01-15")],
            vec![],
        ],
    );

    let backend = backend(&base, TOKEN);
    let rows = backend.read_all(Collection::Alumnos).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], Cell::Int(4));

    let students = StudentRepository::new(backend);
    let ana = students.by_id(4).await.unwrap().unwrap();
    assert_eq!(ana.weight, 61.5);
    assert_eq!(students.next_id().await.unwrap(), 5);
}

#[tokio::test]
async fn test_non_finite_weight_never_reaches_the_sheet() {
    let (base, sheets) = fake_sheets(&["alumnos", "planes"]).await;
    let backend = backend(&base, TOKEN);
    let students = StudentRepository::new(backend.clone());
    let importer = BulkImporter::new(backend, students.clone());

    for weight in ["NaN", "inf"] {
        let csv = format!(
            "nombre,edad,peso,objetivo,fecha_ingreso\nAna,28,{},Fuerza,2024-01-15\n",
            weight
        );
        let err = importer
            .import_students(&ImportTable::parse_csv(&csv))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Import { row: 1, .. }));
    }

    assert!(sheets.lock().unwrap()["alumnos"].is_empty());
    assert!(students.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_token_is_storage_unavailable() {
    let (base, _) = fake_sheets(&["alumnos", "planes"]).await;
    let backend = backend(&base, "expired-token");

    let err = backend.read_all(Collection::Alumnos).await.unwrap_err();
    match err {
        AppError::StorageUnavailable(msg) => assert!(msg.contains("authentication")),
        other => panic!("expected storage error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_worksheet_is_named() {
    let (base, _) = fake_sheets(&["alumnos"]).await;
    let backend = backend(&base, TOKEN);

    let err = backend.read_all(Collection::Planes).await.unwrap_err();
    match err {
        AppError::StorageUnavailable(msg) => assert!(msg.contains("'planes'")),
        other => panic!("expected storage error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_storage_unavailable() {
    let backend = backend("http://127.0.0.1:1", TOKEN);
    let err = backend.read_all(Collection::Alumnos).await.unwrap_err();
    assert!(matches!(err, AppError::StorageUnavailable(_)));
}
