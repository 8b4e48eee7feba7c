// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Student (alumno) model and its storage row mapping.

use crate::db::{cell, Cell, Collection, Row};
use crate::error::AppError;
use crate::models::fold_label;
use crate::time_utils::{format_iso_date, parse_iso_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accepted ages, inclusive.
pub const AGE_RANGE: std::ops::RangeInclusive<u32> = 10..=100;
/// Lightest accepted body weight, in kg.
pub const MIN_WEIGHT_KG: f64 = 30.0;

/// Training goal chosen at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Goal {
    Hypertrophy,
    WeightLoss,
    Strength,
    Endurance,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown goal: {0}")]
pub struct UnknownGoal(pub String);

impl Goal {
    pub const ALL: [Goal; 4] = [
        Goal::Hypertrophy,
        Goal::WeightLoss,
        Goal::Strength,
        Goal::Endurance,
    ];

    /// Label stored in the `objetivo` column.
    pub fn label(self) -> &'static str {
        match self {
            Goal::Hypertrophy => "Hipertrofia",
            Goal::WeightLoss => "Pérdida de Peso",
            Goal::Strength => "Fuerza",
            Goal::Endurance => "Resistencia",
        }
    }

    fn english_name(self) -> &'static str {
        match self {
            Goal::Hypertrophy => "Hypertrophy",
            Goal::WeightLoss => "WeightLoss",
            Goal::Strength => "Strength",
            Goal::Endurance => "Endurance",
        }
    }
}

impl FromStr for Goal {
    type Err = UnknownGoal;

    /// Accepts the stored Spanish label or the English name, ignoring case,
    /// accents and spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = fold_label(s).chars().filter(|c| !c.is_whitespace()).collect();
        Goal::ALL
            .into_iter()
            .find(|g| {
                let label: String = fold_label(g.label())
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                key == label || key == g.english_name().to_ascii_lowercase()
            })
            .ok_or_else(|| UnknownGoal(s.to_string()))
    }
}

impl TryFrom<String> for Goal {
    type Error = UnknownGoal;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english_name())
    }
}

/// A registered gym member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Assigned at creation, never reused
    pub id: i64,
    pub name: String,
    pub age: u32,
    /// Body weight in kg
    pub weight: f64,
    pub goal: Goal,
    pub join_date: NaiveDate,
}

/// Input for registering a student.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub goal: Goal,
    /// Defaults to the registration date when absent
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
}

impl Student {
    pub fn to_row(&self) -> Row {
        vec![
            Cell::Int(self.id),
            Cell::from(self.name.as_str()),
            Cell::from(self.age),
            Cell::Float(self.weight),
            Cell::from(self.goal.label()),
            Cell::Text(format_iso_date(self.join_date)),
        ]
    }

    /// Decode a stored row. Range limits are not re-checked on read.
    pub fn from_row(row: &[Cell]) -> Result<Self, AppError> {
        let malformed = |field: &str| {
            AppError::StorageUnavailable(format!(
                "Malformed {} row: bad {} ({:?})",
                Collection::Alumnos,
                field,
                row
            ))
        };

        Ok(Student {
            id: cell(row, 0).as_i64().ok_or_else(|| malformed("id"))?,
            name: cell(row, 1).to_text(),
            age: cell(row, 2)
                .as_i64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| malformed("edad"))?,
            weight: cell(row, 3).as_f64().ok_or_else(|| malformed("peso"))?,
            goal: cell(row, 4)
                .to_text()
                .parse()
                .map_err(|_| malformed("objetivo"))?,
            join_date: parse_iso_date(&cell(row, 5).to_text())
                .ok_or_else(|| malformed("fecha_ingreso"))?,
        })
    }
}
