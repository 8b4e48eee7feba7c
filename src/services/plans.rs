// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training plan repository.
//!
//! Plan entries reference students by id. The reference is checked against
//! the student collection before every write; reads tolerate dangling ids.

use crate::db::{next_id_from_rows, Collection, StorageBackend};
use crate::error::{AppError, Result};
use crate::models::plan::sort_plan;
use crate::models::{NewPlanEntry, PlanEntry};
use crate::services::StudentRepository;

/// Create and query plan entries on top of a storage backend.
#[derive(Clone)]
pub struct PlanRepository<B> {
    backend: B,
    students: StudentRepository<B>,
}

impl<B: StorageBackend + Clone> PlanRepository<B> {
    pub fn new(backend: B, students: StudentRepository<B>) -> Self {
        Self { backend, students }
    }

    /// One past the largest stored plan id, or 1 when empty.
    pub async fn next_id(&self) -> Result<i64> {
        let rows = self.backend.read_all(Collection::Planes).await?;
        next_id_from_rows(Collection::Planes, &rows)
    }

    /// Add an exercise to a student's plan.
    ///
    /// Fails with [`AppError::Validation`] and writes nothing when the
    /// exercise is blank, `sets` is zero, or the student does not exist.
    pub async fn add_entry(&self, input: NewPlanEntry) -> Result<PlanEntry> {
        let exercise = input.exercise.trim();
        if exercise.is_empty() {
            return Err(AppError::Validation("Exercise name is required".to_string()));
        }
        if input.sets == 0 {
            return Err(AppError::Validation("Sets must be at least 1".to_string()));
        }
        if self.students.by_id(input.student_id).await?.is_none() {
            tracing::warn!(student_id = input.student_id, "Plan entry for unknown student");
            return Err(AppError::Validation(format!(
                "Student {} does not exist",
                input.student_id
            )));
        }

        let id = self.backend.allocate_ids(Collection::Planes, 1).await?;
        let entry = PlanEntry {
            id,
            student_id: input.student_id,
            exercise: exercise.to_string(),
            sets: input.sets,
            reps: input.reps.trim().to_string(),
            day: input.day,
        };

        self.backend
            .append_rows(Collection::Planes, vec![entry.to_row()])
            .await?;

        tracing::info!(
            plan_id = entry.id,
            student_id = entry.student_id,
            day = %entry.day,
            "Plan entry added"
        );
        Ok(entry)
    }

    /// All plan entries in insertion order.
    pub async fn list_all(&self) -> Result<Vec<PlanEntry>> {
        self.backend
            .read_all(Collection::Planes)
            .await?
            .iter()
            .map(|row| PlanEntry::from_row(row))
            .collect()
    }

    /// A student's plan, ordered by day of the week and then by id.
    pub async fn list_for_student(&self, student_id: i64) -> Result<Vec<PlanEntry>> {
        let mut entries: Vec<PlanEntry> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|e| e.student_id == student_id)
            .collect();
        sort_plan(&mut entries);
        Ok(entries)
    }
}
