// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process storage backend.
//!
//! Used for tests and offline development. Clones share the same rows. A few
//! knobs let tests simulate a medium without batch append, an unreachable
//! medium, or one that starts failing after a number of appends.

use crate::db::{Collection, Row, StorageBackend};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct MemoryState {
    rows: HashMap<Collection, Vec<Row>>,
    appends: usize,
}

/// In-memory storage backend.
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    offline: bool,
    batch_append: bool,
    fail_after_appends: Option<usize>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            offline: false,
            batch_append: true,
            fail_after_appends: None,
        }
    }

    /// A backend where every call fails as if the medium were unreachable.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new()
        }
    }

    /// Report no batch-append support, forcing row-by-row imports.
    pub fn without_batch_append(mut self) -> Self {
        self.batch_append = false;
        self
    }

    /// Let `n` append calls succeed, then fail every later one.
    pub fn fail_after_appends(mut self, n: usize) -> Self {
        self.fail_after_appends = Some(n);
        self
    }

    /// Number of rows currently stored in `collection`.
    pub fn row_count(&self, collection: Collection) -> usize {
        self.lock()
            .map(|state| state.rows.get(&collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Store rows directly, bypassing the repositories (for fixtures).
    pub fn seed(&self, collection: Collection, rows: Vec<Row>) {
        if let Ok(mut state) = self.lock() {
            state.rows.entry(collection).or_default().extend(rows);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, AppError> {
        if self.offline {
            return Err(AppError::StorageUnavailable(
                "Memory backend is offline".to_string(),
            ));
        }
        self.state
            .lock()
            .map_err(|_| AppError::StorageUnavailable("Memory backend lock poisoned".to_string()))
    }
}

impl StorageBackend for MemoryBackend {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Row>, AppError> {
        let state = self.lock()?;
        Ok(state.rows.get(&collection).cloned().unwrap_or_default())
    }

    async fn append_rows(&self, collection: Collection, rows: Vec<Row>) -> Result<(), AppError> {
        let mut state = self.lock()?;

        if let Some(limit) = self.fail_after_appends {
            if state.appends >= limit {
                return Err(AppError::StorageUnavailable(format!(
                    "Simulated append failure on {}",
                    collection
                )));
            }
        }

        state.appends += 1;
        state.rows.entry(collection).or_default().extend(rows);
        Ok(())
    }

    fn supports_batch_append(&self) -> bool {
        self.batch_append
    }
}
