// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite storage backend.
//!
//! Statements run on the blocking thread pool. Each `append_rows` call
//! commits as one transaction. Ids come from the `id_sequences` table,
//! advanced under an IMMEDIATE transaction, so several processes sharing the
//! database file never hand out the same id.

use crate::db::{Cell, Collection, Row, StorageBackend};
use crate::error::AppError;
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// SQLite database handle.
#[derive(Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open (or create) the database file and make sure the schema exists.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::StorageUnavailable(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "Opened SQLite database");
        Self::init(conn)
    }

    /// A private database that lives as long as the handle.
    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, AppError> {
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS alumnos(
                id INTEGER PRIMARY KEY,
                nombre TEXT NOT NULL,
                edad INTEGER NOT NULL,
                peso REAL NOT NULL,
                objetivo TEXT NOT NULL,
                fecha_ingreso TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS planes(
                id INTEGER PRIMARY KEY,
                alumno_id INTEGER NOT NULL,
                ejercicio TEXT NOT NULL,
                series INTEGER NOT NULL,
                repeticiones TEXT NOT NULL,
                dia INTEGER NOT NULL,
                FOREIGN KEY(alumno_id) REFERENCES alumnos(id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_planes_alumno ON planes(alumno_id)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS id_sequences(
                collection TEXT PRIMARY KEY,
                next_id INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, AppError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| {
                AppError::StorageUnavailable("SQLite connection lock poisoned".to_string())
            })?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("SQLite task failed: {}", e)))?
    }
}

impl StorageBackend for SqliteBackend {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Row>, AppError> {
        let rows = self
            .with_conn(move |conn| {
                let arity = collection.arity();
                let sql = format!(
                    "SELECT {} FROM {} ORDER BY id",
                    collection.columns().join(", "),
                    collection.name()
                );

                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], |r| {
                        (0..arity)
                            .map(|i| r.get_ref(i).map(cell_from_sql))
                            .collect::<rusqlite::Result<Row>>()
                    })?
                    .collect::<rusqlite::Result<Vec<Row>>>()?;
                Ok(rows)
            })
            .await?;

        tracing::debug!(collection = %collection, count = rows.len(), "Read rows");
        Ok(rows)
    }

    async fn append_rows(&self, collection: Collection, rows: Vec<Row>) -> Result<(), AppError> {
        let arity = collection.arity();
        if let Some(bad) = rows.iter().find(|r| r.len() != arity) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "Row for {} has {} cells, expected {}",
                collection,
                bad.len(),
                arity
            )));
        }

        let count = rows.len();
        self.with_conn(move |conn| {
            let placeholders = (1..=arity)
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO {}({}) VALUES ({})",
                collection.name(),
                collection.columns().join(", "),
                placeholders
            );

            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&sql)?;
                for row in &rows {
                    stmt.execute(rusqlite::params_from_iter(row.iter()))?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await?;

        tracing::debug!(collection = %collection, count, "Appended rows");
        Ok(())
    }

    async fn allocate_ids(&self, collection: Collection, count: usize) -> Result<i64, AppError> {
        let first = self
            .with_conn(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                let sequenced: Option<i64> = tx
                    .query_row(
                        "SELECT next_id FROM id_sequences WHERE collection = ?1",
                        [collection.name()],
                        |r| r.get(0),
                    )
                    .optional()?;
                let max_id: i64 = tx.query_row(
                    &format!("SELECT COALESCE(MAX(id), 0) FROM {}", collection.name()),
                    [],
                    |r| r.get(0),
                )?;

                // Rows written by other tools bypass the sequence; never go below them.
                let first = sequenced.unwrap_or(1).max(max_id + 1);
                let next = first + count as i64;

                tx.execute(
                    "INSERT INTO id_sequences(collection, next_id) VALUES (?1, ?2)
                     ON CONFLICT(collection) DO UPDATE SET next_id = excluded.next_id",
                    params![collection.name(), next],
                )?;
                tx.commit()?;
                Ok(first)
            })
            .await?;

        tracing::debug!(collection = %collection, first, count, "Allocated ids");
        Ok(first)
    }
}

fn cell_from_sql(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Cell::Empty,
        ValueRef::Integer(v) => Cell::Int(v),
        ValueRef::Real(v) => Cell::Float(v),
        ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Empty => ToSqlOutput::Owned(Value::Null),
            Cell::Int(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            Cell::Float(v) => ToSqlOutput::Owned(Value::Real(*v)),
            Cell::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}
