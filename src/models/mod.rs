// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod day;
pub mod plan;
pub mod student;

pub use day::Day;
pub use plan::{NewPlanEntry, PlanEntry};
pub use student::{Goal, NewStudent, Student};

/// Lowercase and strip Spanish accents, so "Miércoles" matches "miercoles".
pub(crate) fn fold_label(input: &str) -> String {
    input
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}
