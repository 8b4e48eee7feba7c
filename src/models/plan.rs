// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training plan entry model.

use crate::db::{cell, Cell, Collection, Row};
use crate::error::AppError;
use crate::models::Day;
use serde::{Deserialize, Serialize};

/// One exercise prescribed to a student on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: i64,
    /// Owning student; valid when written, not re-checked on read
    pub student_id: i64,
    pub exercise: String,
    pub sets: u32,
    /// Free-form repetitions, e.g. "10-12"
    pub reps: String,
    pub day: Day,
}

/// Input for adding an exercise to a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlanEntry {
    pub student_id: i64,
    pub exercise: String,
    pub sets: u32,
    #[serde(default)]
    pub reps: String,
    pub day: Day,
}

impl PlanEntry {
    pub fn to_row(&self) -> Row {
        vec![
            Cell::Int(self.id),
            Cell::Int(self.student_id),
            Cell::from(self.exercise.as_str()),
            Cell::from(self.sets),
            Cell::from(self.reps.as_str()),
            Cell::Int(self.day.code()),
        ]
    }

    /// Decode a stored row. The `dia` cell may be a code or, on older
    /// spreadsheets, a day name.
    pub fn from_row(row: &[Cell]) -> Result<Self, AppError> {
        let malformed = |field: &str| {
            AppError::StorageUnavailable(format!(
                "Malformed {} row: bad {} ({:?})",
                Collection::Planes,
                field,
                row
            ))
        };

        let day = match cell(row, 5) {
            Cell::Text(name) => Day::parse(name),
            other => other.as_i64().and_then(Day::from_code),
        };

        Ok(PlanEntry {
            id: cell(row, 0).as_i64().ok_or_else(|| malformed("id"))?,
            student_id: cell(row, 1).as_i64().ok_or_else(|| malformed("alumno_id"))?,
            exercise: cell(row, 2).to_text(),
            sets: cell(row, 3)
                .as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| malformed("series"))?,
            reps: cell(row, 4).to_text(),
            day: day.ok_or_else(|| malformed("dia"))?,
        })
    }
}

/// Canonical plan order: by day of the week, then by id.
pub fn sort_plan(entries: &mut [PlanEntry]) {
    entries.sort_by_key(|e| (e.day, e.id));
}
