// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Student repository.

use crate::db::{next_id_from_rows, Collection, StorageBackend};
use crate::error::{AppError, Result};
use crate::models::{NewStudent, Student};
use crate::time_utils::today;

/// Create and query students on top of a storage backend.
#[derive(Clone)]
pub struct StudentRepository<B> {
    backend: B,
}

impl<B: StorageBackend + Clone> StudentRepository<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// One past the largest stored id, or 1 when there are no students.
    pub async fn next_id(&self) -> Result<i64> {
        let rows = self.backend.read_all(Collection::Alumnos).await?;
        next_id_from_rows(Collection::Alumnos, &rows)
    }

    /// Register a student and append it to storage.
    pub async fn create(&self, input: NewStudent) -> Result<Student> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Student name is required".to_string()));
        }
        if !input.weight.is_finite() {
            return Err(AppError::Validation(format!(
                "Weight must be a number, got {}",
                input.weight
            )));
        }

        let id = self.backend.allocate_ids(Collection::Alumnos, 1).await?;
        let student = Student {
            id,
            name: name.to_string(),
            age: input.age,
            weight: input.weight,
            goal: input.goal,
            join_date: input.join_date.unwrap_or_else(today),
        };

        self.backend
            .append_rows(Collection::Alumnos, vec![student.to_row()])
            .await?;

        tracing::info!(student_id = student.id, "Student registered");
        Ok(student)
    }

    /// All students in insertion order.
    pub async fn list_all(&self) -> Result<Vec<Student>> {
        self.backend
            .read_all(Collection::Alumnos)
            .await?
            .iter()
            .map(|row| Student::from_row(row))
            .collect()
    }

    pub async fn by_id(&self, id: i64) -> Result<Option<Student>> {
        Ok(self.list_all().await?.into_iter().find(|s| s.id == id))
    }
}
