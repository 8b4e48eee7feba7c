// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bulk import of students and plan entries from tabular data.
//!
//! An import runs in three steps:
//! 1. Check the header once against the required column set
//! 2. Convert every row into a typed record
//! 3. Reserve one block of ids and append, in one call when the backend
//!    allows it, otherwise row by row
//!
//! Nothing is written if steps 1 or 2 fail. A failure in step 3 leaves the
//! collection in an unspecified state.

use crate::db::{Collection, Row, StorageBackend};
use crate::error::{AppError, Result};
use crate::models::student::{AGE_RANGE, MIN_WEIGHT_KG};
use crate::models::{Day, Goal, PlanEntry, Student};
use crate::services::StudentRepository;
use crate::time_utils::{parse_iso_date, today};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const STUDENT_IMPORT_COLUMNS: [&str; 5] = ["nombre", "edad", "peso", "objetivo", "fecha_ingreso"];
pub const PLAN_IMPORT_COLUMNS: [&str; 5] = ["alumno_id", "ejercicio", "series", "repeticiones", "dia"];

/// Parsed tabular input: a header row and string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ImportTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parse CSV text. The first non-blank line is the header.
    ///
    /// Handles quoted fields with embedded commas and `""` escapes; blank
    /// lines are skipped. Quoted fields may not span lines.
    pub fn parse_csv(text: &str) -> Self {
        let mut lines = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty());

        let headers = lines
            .next()
            .map(|l| {
                parse_csv_record(l.trim_start_matches('\u{feff}'))
                    .into_iter()
                    .map(|h| h.trim().to_string())
                    .collect()
            })
            .unwrap_or_default();
        let rows = lines.map(parse_csv_record).collect();

        Self { headers, rows }
    }

    /// Fail with [`AppError::Schema`] unless every column in `required` is present.
    pub fn require_columns(&self, required: &[&str]) -> Result<ColumnIndex> {
        let positions: HashMap<&str, usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        let missing: Vec<String> = required
            .iter()
            .filter(|c| !positions.contains_key(*c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Schema { missing });
        }

        Ok(ColumnIndex {
            positions: required.iter().map(|c| (c.to_string(), positions[c])).collect(),
        })
    }
}

/// Column positions resolved from a header.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    /// Trimmed value of `column` in `row`; short rows read as empty.
    fn get<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.positions
            .get(column)
            .and_then(|&i| row.get(i))
            .map(|v| v.trim())
            .unwrap_or("")
    }
}

fn parse_csv_record(line: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                buf.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => out.push(std::mem::take(&mut buf)),
            _ => buf.push(ch),
        }
    }
    out.push(buf);
    out
}

/// Outcome of a successful import.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS), ts(export))]
pub struct ImportResult {
    /// Rows written
    pub imported: usize,
    /// Id given to the first row; absent for an empty batch
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub first_id: Option<i64>,
}

struct StudentRecord {
    name: String,
    age: u32,
    weight: f64,
    goal: Goal,
    join_date: chrono::NaiveDate,
}

struct PlanRecord {
    student_id: i64,
    exercise: String,
    sets: u32,
    reps: String,
    day: Day,
}

/// Ingests externally supplied tables into the student and plan collections.
#[derive(Clone)]
pub struct BulkImporter<B> {
    backend: B,
    students: StudentRepository<B>,
}

impl<B: StorageBackend + Clone> BulkImporter<B> {
    pub fn new(backend: B, students: StudentRepository<B>) -> Self {
        Self { backend, students }
    }

    /// Import students. Columns: `nombre, edad, peso, objetivo, fecha_ingreso`.
    ///
    /// An empty `fecha_ingreso` defaults to today.
    pub async fn import_students(&self, table: &ImportTable) -> Result<ImportResult> {
        let columns = table.require_columns(&STUDENT_IMPORT_COLUMNS)?;

        let records = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| student_record(&columns, row).map_err(|message| row_error(i, message)))
            .collect::<Result<Vec<_>>>()?;

        self.write_batch(Collection::Alumnos, records, |id, r| {
            Student {
                id,
                name: r.name,
                age: r.age,
                weight: r.weight,
                goal: r.goal,
                join_date: r.join_date,
            }
            .to_row()
        })
        .await
    }

    /// Import plan entries. Columns: `alumno_id, ejercicio, series, repeticiones, dia`.
    ///
    /// `dia` may be a code (1 = Monday) or a day name. Every `alumno_id` must
    /// name an existing student, as for interactive adds; otherwise the whole
    /// batch fails with [`AppError::Validation`] and nothing is written.
    pub async fn import_plan_entries(&self, table: &ImportTable) -> Result<ImportResult> {
        let columns = table.require_columns(&PLAN_IMPORT_COLUMNS)?;

        let records = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| plan_record(&columns, row).map_err(|message| row_error(i, message)))
            .collect::<Result<Vec<_>>>()?;

        if !records.is_empty() {
            let known: HashSet<i64> = self
                .students
                .list_all()
                .await?
                .into_iter()
                .map(|s| s.id)
                .collect();

            if let Some((i, r)) = records
                .iter()
                .enumerate()
                .find(|(_, r)| !known.contains(&r.student_id))
            {
                tracing::warn!(row = i + 1, student_id = r.student_id, "Import references unknown student");
                return Err(AppError::Validation(format!(
                    "Row {}: student {} does not exist",
                    i + 1,
                    r.student_id
                )));
            }
        }

        self.write_batch(Collection::Planes, records, |id, r| {
            PlanEntry {
                id,
                student_id: r.student_id,
                exercise: r.exercise,
                sets: r.sets,
                reps: r.reps,
                day: r.day,
            }
            .to_row()
        })
        .await
    }

    /// Assign sequential ids from one allocation and append the rows.
    async fn write_batch<T, F>(
        &self,
        collection: Collection,
        records: Vec<T>,
        to_row: F,
    ) -> Result<ImportResult>
    where
        T: Send,
        F: Fn(i64, T) -> Row + Send,
    {
        if records.is_empty() {
            return Ok(ImportResult {
                imported: 0,
                first_id: None,
            });
        }

        let count = records.len();
        let first_id = self.backend.allocate_ids(collection, count).await?;
        let rows: Vec<Row> = records
            .into_iter()
            .zip(first_id..)
            .map(|(record, id)| to_row(id, record))
            .collect();

        if self.backend.supports_batch_append() {
            self.backend.append_rows(collection, rows).await?;
        } else {
            for (i, row) in rows.into_iter().enumerate() {
                self.backend
                    .append_rows(collection, vec![row])
                    .await
                    .map_err(|e| row_error(i, e.to_string()))?;
            }
        }

        tracing::info!(collection = %collection, count, first_id, "Bulk import complete");
        Ok(ImportResult {
            imported: count,
            first_id: Some(first_id),
        })
    }
}

/// Row numbers in errors are 1-based and exclude the header.
fn row_error(index: usize, message: String) -> AppError {
    AppError::Import {
        row: index + 1,
        message,
    }
}

fn student_record(
    columns: &ColumnIndex,
    row: &[String],
) -> std::result::Result<StudentRecord, String> {
    let name = columns.get(row, "nombre");
    if name.is_empty() {
        return Err("nombre is empty".to_string());
    }

    let raw_age = columns.get(row, "edad");
    let age = parse_whole(raw_age)
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| AGE_RANGE.contains(v))
        .ok_or_else(|| format!("invalid edad '{}'", raw_age))?;

    // "NaN" and "inf" parse as f64 but cannot be stored in either medium.
    let raw_weight = columns.get(row, "peso");
    let weight = raw_weight
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= MIN_WEIGHT_KG)
        .ok_or_else(|| format!("invalid peso '{}'", raw_weight))?;

    let goal = columns
        .get(row, "objetivo")
        .parse::<Goal>()
        .map_err(|e| e.to_string())?;

    let raw_date = columns.get(row, "fecha_ingreso");
    let join_date = if raw_date.is_empty() {
        today()
    } else {
        parse_iso_date(raw_date).ok_or_else(|| format!("invalid fecha_ingreso '{}'", raw_date))?
    };

    Ok(StudentRecord {
        name: name.to_string(),
        age,
        weight,
        goal,
        join_date,
    })
}

fn plan_record(columns: &ColumnIndex, row: &[String]) -> std::result::Result<PlanRecord, String> {
    let raw_student = columns.get(row, "alumno_id");
    let student_id =
        parse_whole(raw_student).ok_or_else(|| format!("invalid alumno_id '{}'", raw_student))?;

    let exercise = columns.get(row, "ejercicio");
    if exercise.is_empty() {
        return Err("ejercicio is empty".to_string());
    }

    let raw_sets = columns.get(row, "series");
    let sets = parse_whole(raw_sets)
        .and_then(|v| u32::try_from(v).ok())
        .filter(|&v| v > 0)
        .ok_or_else(|| format!("invalid series '{}'", raw_sets))?;

    let day = columns
        .get(row, "dia")
        .parse::<Day>()
        .map_err(|e| e.to_string())?;

    Ok(PlanRecord {
        student_id,
        exercise: exercise.to_string(),
        sets,
        reps: columns.get(row, "repeticiones").to_string(),
        day,
    })
}

/// Integer cell; spreadsheet exports often write whole numbers as "3.0".
fn parse_whole(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64)
    })
}
