// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bulk CSV import routes.
//!
//! The request body is the raw CSV file, header row first.

use crate::error::Result;
use crate::services::{ImportResult, ImportTable};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/import/students", post(import_students))
        .route("/api/import/plans", post(import_plans))
}

async fn import_students(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportResult>> {
    let table = ImportTable::parse_csv(&body);
    tracing::info!(rows = table.rows.len(), "Importing students");
    Ok(Json(state.importer.import_students(&table).await?))
}

async fn import_plans(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportResult>> {
    let table = ImportTable::parse_csv(&body);
    tracing::info!(rows = table.rows.len(), "Importing plan entries");
    Ok(Json(state.importer.import_plan_entries(&table).await?))
}
