// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Sheets storage backend.
//!
//! Each collection is a worksheet of the same name whose first row holds the
//! column names. The medium has no auto-increment and no foreign keys, so ids
//! use the default max-scan and referential checks stay in the repositories.
//! An append is a single `values:append` request and is not atomic.

use crate::config::{SheetsConfig, SheetsCredentials};
use crate::db::{Cell, Collection, Row, StorageBackend};
use crate::error::AppError;
use crate::services::google_auth::{
    AccessTokenSource, ServiceAccountKey, ServiceAccountTokenSource, SHEETS_SCOPE,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Google Sheets client bound to one spreadsheet.
#[derive(Clone)]
pub struct SheetsBackend {
    http: reqwest::Client,
    api_base: String,
    spreadsheet_id: String,
    auth: Arc<AccessTokenSource>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsBackend {
    pub fn new(config: &SheetsConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::StorageUnavailable(format!("HTTP client: {}", e)))?;

        let auth = match &config.credentials {
            SheetsCredentials::AccessToken(token) => AccessTokenSource::Static(token.clone()),
            SheetsCredentials::ServiceAccountFile(path) => {
                let key = ServiceAccountKey::from_file(path)
                    .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
                tracing::info!(client_email = %key.client_email, "Using service account");
                AccessTokenSource::ServiceAccount(
                    ServiceAccountTokenSource::new(http.clone(), key, SHEETS_SCOPE)
                        .map_err(|e| AppError::StorageUnavailable(e.to_string()))?,
                )
            }
        };

        tracing::info!(spreadsheet = %config.spreadsheet_id, "Configured Google Sheets");

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            auth: Arc::new(auth),
        })
    }

    /// Percent-encoded A1 range spanning the collection's columns.
    fn range(collection: Collection) -> String {
        let last_column = (b'A' + (collection.arity() as u8 - 1)) as char;
        let range = format!("{}!A:{}", collection.name(), last_column);
        urlencoding::encode(&range).into_owned()
    }

    fn values_url(&self, collection: Collection) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base,
            urlencoding::encode(&self.spreadsheet_id),
            Self::range(collection)
        )
    }

    async fn bearer(&self) -> Result<String, AppError> {
        self.auth
            .token()
            .await
            .map_err(|e| AppError::StorageUnavailable(format!("Sheets authentication: {}", e)))
    }

    /// Raw worksheet contents, header row included.
    async fn fetch_values(&self, collection: Collection) -> Result<Vec<Vec<Value>>, AppError> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(self.values_url(collection))
            .bearer_auth(token)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StorageUnavailable(format!("Sheets request failed: {}", e)))?;

        let response = check_response(collection, response).await?;
        let range: ValueRange = response.json().await.map_err(|e| {
            AppError::StorageUnavailable(format!("Sheets JSON parse error: {}", e))
        })?;
        Ok(range.values)
    }
}

impl StorageBackend for SheetsBackend {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Row>, AppError> {
        let values = self.fetch_values(collection).await?;
        let rows = rows_from_values(collection, values);
        tracing::debug!(collection = %collection, count = rows.len(), "Read rows");
        Ok(rows)
    }

    async fn append_rows(&self, collection: Collection, rows: Vec<Row>) -> Result<(), AppError> {
        if rows.is_empty() {
            return Ok(());
        }

        // Keep the worksheet readable by other tools: an empty sheet gets a header.
        let mut values: Vec<Vec<Value>> = Vec::with_capacity(rows.len() + 1);
        if self.fetch_values(collection).await?.is_empty() {
            values.push(collection.columns().iter().map(|c| Value::from(*c)).collect());
        }
        values.extend(rows.iter().map(|row| row.iter().map(value_from_cell).collect()));

        let token = self.bearer().await?;
        let response = self
            .http
            .post(format!("{}:append", self.values_url(collection)))
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&serde_json::json!({ "majorDimension": "ROWS", "values": values }))
            .send()
            .await
            .map_err(|e| AppError::StorageUnavailable(format!("Sheets request failed: {}", e)))?;

        check_response(collection, response).await?;
        tracing::debug!(collection = %collection, count = rows.len(), "Appended rows");
        Ok(())
    }
}

/// Map non-success statuses to a diagnostic `StorageUnavailable`.
async fn check_response(
    collection: Collection,
    response: reqwest::Response,
) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = match status.as_u16() {
        401 | 403 => format!("Sheets authentication failed (HTTP {}): {}", status, body),
        404 => format!("Spreadsheet not found (HTTP {}): {}", status, body),
        400 if body.contains("Unable to parse range") => {
            format!("Worksheet '{}' not found", collection)
        }
        _ => format!("Sheets HTTP {}: {}", status, body),
    };

    tracing::warn!(collection = %collection, status = status.as_u16(), "Sheets request rejected");
    Err(AppError::StorageUnavailable(message))
}

/// Convert worksheet values to rows: drop the header and blank lines, pad
/// short rows (the API trims trailing empty cells).
fn rows_from_values(collection: Collection, values: Vec<Vec<Value>>) -> Vec<Row> {
    let arity = collection.arity();
    let mut rows = Vec::with_capacity(values.len());

    for (index, raw) in values.into_iter().enumerate() {
        let mut row: Row = raw.into_iter().take(arity).map(cell_from_value).collect();

        if index == 0 && is_header(collection, &row) {
            continue;
        }
        if row.iter().all(Cell::is_empty) {
            continue;
        }

        row.resize(arity, Cell::Empty);
        rows.push(row);
    }

    rows
}

fn is_header(collection: Collection, row: &[Cell]) -> bool {
    matches!(row.first(), Some(Cell::Text(first)) if first.trim().eq_ignore_ascii_case(collection.columns()[0]))
}

fn cell_from_value(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Empty),
        },
        Value::String(s) if s.is_empty() => Cell::Empty,
        Value::String(s) => Cell::Text(s),
        Value::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

fn value_from_cell(cell: &Cell) -> Value {
    match cell {
        Cell::Empty => Value::String(String::new()),
        Cell::Int(v) => Value::from(*v),
        Cell::Float(v) => Value::from(*v),
        Cell::Text(s) => Value::from(s.as_str()),
    }
}
