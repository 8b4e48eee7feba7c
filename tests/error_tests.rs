// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use gym_tracker::error::AppError;

#[test]
fn test_error_codes() {
    assert_eq!(AppError::Validation("x".into()).code(), "validation_error");
    assert_eq!(
        AppError::Schema { missing: vec!["dia".into()] }.code(),
        "schema_error"
    );
    assert_eq!(
        AppError::StorageUnavailable("down".into()).code(),
        "storage_unavailable"
    );
    assert_eq!(
        AppError::Import { row: 2, message: "bad".into() }.code(),
        "import_error"
    );
}

#[test]
fn test_error_status_mapping() {
    let cases = [
        (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
        (
            AppError::Schema { missing: vec!["nombre".into()] },
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (
            AppError::Import { row: 1, message: "bad".into() },
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (AppError::StorageUnavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(err.into_response().status(), status);
    }
}

#[test]
fn test_error_messages_name_the_problem() {
    let err = AppError::Schema {
        missing: vec!["objetivo".into(), "fecha_ingreso".into()],
    };
    assert_eq!(
        err.to_string(),
        "Import is missing required columns: objetivo, fecha_ingreso"
    );

    let err = AppError::Import { row: 3, message: "invalid edad 'x'".into() };
    assert_eq!(err.to_string(), "Import failed at row 3: invalid edad 'x'");
}
