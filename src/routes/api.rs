// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Student and plan routes.
//!
//! Range limits on age, weight and sets are enforced here, where the
//! external shell's input widgets would enforce them. The repositories only
//! re-check what they cannot trust any caller with.

use crate::error::{AppError, Result};
use crate::models::{Day, Goal, NewPlanEntry, NewStudent, PlanEntry, Student};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route("/api/students/{id}", get(get_student))
        .route("/api/students/{id}/plan", get(get_student_plan))
        .route("/api/plans", post(add_plan_entry))
}

/// Unwrap a JSON body, turning extractor rejections into `BadRequest`.
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn validated<T: Validate>(body: T) -> Result<T> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(body)
}

// ─── Students ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 10, max = 100))]
    pub age: u32,
    #[validate(range(min = 30.0))]
    pub weight: f64,
    pub goal: Goal,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
}

async fn list_students(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Student>>> {
    Ok(Json(state.students.list_all().await?))
}

async fn create_student(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>)> {
    let req = validated(json_body(payload)?)?;

    let student = state
        .students
        .create(NewStudent {
            name: req.name,
            age: req.age,
            weight: req.weight,
            goal: req.goal,
            join_date: req.join_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(student)))
}

async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Student>> {
    state
        .students
        .by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Student {} not found", id)))
}

// ─── Plans ───────────────────────────────────────────────────

async fn get_student_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<PlanEntry>>> {
    if state.students.by_id(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Student {} not found", id)));
    }

    Ok(Json(state.plans.list_for_student(id).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddPlanEntryRequest {
    pub student_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub exercise: String,
    #[validate(range(min = 1))]
    pub sets: u32,
    #[serde(default)]
    pub reps: String,
    /// Day name or code (1 = Monday)
    pub day: Day,
}

async fn add_plan_entry(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AddPlanEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PlanEntry>)> {
    let req = validated(json_body(payload)?)?;

    let entry = state
        .plans
        .add_entry(NewPlanEntry {
            student_id: req.student_id,
            exercise: req.exercise,
            sets: req.sets,
            reps: req.reps,
            day: req.day,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}
