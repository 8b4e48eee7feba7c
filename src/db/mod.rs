// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer.
//!
//! Every medium is reduced to the same two primitives, "read all rows of a
//! collection" and "append rows", plus an id-allocation hook that a medium
//! can override when it has something stronger than a max-scan.

pub mod memory;
pub mod sheets;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sheets::SheetsBackend;
pub use sqlite::SqliteBackend;

use crate::config::StorageConfig;
use crate::error::AppError;
use std::fmt;
use std::future::Future;

/// Collection names as constants.
pub mod collections {
    pub const ALUMNOS: &str = "alumnos";
    pub const PLANES: &str = "planes";
}

/// The persisted collections, with their fixed column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Alumnos,
    Planes,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Alumnos => collections::ALUMNOS,
            Collection::Planes => collections::PLANES,
        }
    }

    /// Column names in storage order. The first column is always `id`.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Collection::Alumnos => &["id", "nombre", "edad", "peso", "objetivo", "fecha_ingreso"],
            Collection::Planes => &["id", "alumno_id", "ejercicio", "series", "repeticiones", "dia"],
        }
    }

    pub fn arity(self) -> usize {
        self.columns().len()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single scalar field of a stored row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Integer view. Spreadsheets hand back whole numbers as floats and
    /// sometimes as text, so both are accepted when they hold an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            Cell::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(s) => s.trim().replace(',', ".").parse().ok(),
            Cell::Empty => None,
        }
    }

    /// Text view; numbers are rendered, empty cells become "".
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<u32> for Cell {
    fn from(v: u32) -> Self {
        Cell::Int(i64::from(v))
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

/// A fixed-arity tuple of cells in the collection's column order.
pub type Row = Vec<Cell>;

/// Cell at `index`, or an empty cell when the row is short.
///
/// Spreadsheet reads drop trailing blank cells, so short rows are normal.
pub fn cell(row: &[Cell], index: usize) -> &Cell {
    row.get(index).unwrap_or(&EMPTY_CELL)
}

/// Max-scan id allocation: one past the largest stored id, or 1 when empty.
pub fn next_id_from_rows(collection: Collection, rows: &[Row]) -> Result<i64, AppError> {
    let mut max_id = 0;
    for (index, row) in rows.iter().enumerate() {
        let id = cell(row, 0).as_i64().ok_or_else(|| {
            AppError::StorageUnavailable(format!(
                "Malformed id in {} row {}: {:?}",
                collection,
                index + 1,
                cell(row, 0)
            ))
        })?;
        max_id = max_id.max(id);
    }
    Ok(max_id + 1)
}

/// A persistence medium holding the `alumnos` and `planes` collections.
///
/// Every failure is reported as [`AppError::StorageUnavailable`].
pub trait StorageBackend: Send + Sync {
    /// All rows of `collection` in insertion order.
    fn read_all(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<Row>, AppError>> + Send;

    /// Append `rows` to `collection`.
    fn append_rows(
        &self,
        collection: Collection,
        rows: Vec<Row>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Reserve `count` consecutive ids and return the first one.
    ///
    /// The default is a max-scan over `read_all`. It is only correct when no
    /// other writer appends between this call and the caller's append.
    fn allocate_ids(
        &self,
        collection: Collection,
        _count: usize,
    ) -> impl Future<Output = Result<i64, AppError>> + Send {
        async move {
            let rows = self.read_all(collection).await?;
            next_id_from_rows(collection, &rows)
        }
    }

    /// Whether a whole import batch may be appended in one call.
    fn supports_batch_append(&self) -> bool {
        true
    }
}

/// The storage medium selected at startup.
#[derive(Clone)]
pub enum Backend {
    Sqlite(SqliteBackend),
    Sheets(SheetsBackend),
    Memory(MemoryBackend),
}

impl Backend {
    /// Open the medium described by the configuration.
    pub async fn connect(config: &StorageConfig) -> Result<Self, AppError> {
        let backend = match config {
            StorageConfig::Sqlite { path } => Backend::Sqlite(SqliteBackend::open(path)?),
            StorageConfig::Sheets(sheets) => Backend::Sheets(SheetsBackend::new(sheets)?),
            StorageConfig::Memory => Backend::Memory(MemoryBackend::new()),
        };

        tracing::info!(backend = config.kind(), "Storage backend ready");
        Ok(backend)
    }
}

impl StorageBackend for Backend {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Row>, AppError> {
        match self {
            Backend::Sqlite(b) => b.read_all(collection).await,
            Backend::Sheets(b) => b.read_all(collection).await,
            Backend::Memory(b) => b.read_all(collection).await,
        }
    }

    async fn append_rows(&self, collection: Collection, rows: Vec<Row>) -> Result<(), AppError> {
        match self {
            Backend::Sqlite(b) => b.append_rows(collection, rows).await,
            Backend::Sheets(b) => b.append_rows(collection, rows).await,
            Backend::Memory(b) => b.append_rows(collection, rows).await,
        }
    }

    async fn allocate_ids(&self, collection: Collection, count: usize) -> Result<i64, AppError> {
        match self {
            Backend::Sqlite(b) => b.allocate_ids(collection, count).await,
            Backend::Sheets(b) => b.allocate_ids(collection, count).await,
            Backend::Memory(b) => b.allocate_ids(collection, count).await,
        }
    }

    fn supports_batch_append(&self) -> bool {
        match self {
            Backend::Sqlite(b) => b.supports_batch_append(),
            Backend::Sheets(b) => b.supports_batch_append(),
            Backend::Memory(b) => b.supports_batch_append(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_integer_views() {
        assert_eq!(Cell::Int(4).as_i64(), Some(4));
        assert_eq!(Cell::Float(4.0).as_i64(), Some(4));
        assert_eq!(Cell::Float(4.5).as_i64(), None);
        assert_eq!(Cell::Text(" 12 ".into()).as_i64(), Some(12));
        assert_eq!(Cell::Empty.as_i64(), None);
    }

    #[test]
    fn test_cell_float_accepts_decimal_comma() {
        assert_eq!(Cell::Text("60,5".into()).as_f64(), Some(60.5));
        assert_eq!(Cell::Int(82).as_f64(), Some(82.0));
    }

    #[test]
    fn test_next_id_from_rows() {
        assert_eq!(next_id_from_rows(Collection::Alumnos, &[]).unwrap(), 1);

        let rows = vec![
            vec![Cell::Int(3)],
            vec![Cell::Float(7.0)],
            vec![Cell::Text("5".into())],
        ];
        assert_eq!(next_id_from_rows(Collection::Alumnos, &rows).unwrap(), 8);
    }

    #[test]
    fn test_next_id_rejects_malformed_id() {
        let rows = vec![vec![Cell::Text("abc".into())]];
        let err = next_id_from_rows(Collection::Planes, &rows).unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
    }

    #[test]
    fn test_short_row_reads_empty() {
        let row = vec![Cell::Int(1)];
        assert_eq!(cell(&row, 4), &Cell::Empty);
    }
}
