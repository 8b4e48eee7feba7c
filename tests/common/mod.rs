// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::NaiveDate;
use gym_tracker::config::Config;
use gym_tracker::db::{Backend, MemoryBackend};
use gym_tracker::models::{Goal, NewStudent};
use gym_tracker::routes::create_router;
use gym_tracker::AppState;
use std::sync::Arc;

/// Create a test app over a fresh in-memory backend.
/// Returns the router, the shared state and the backend for inspection.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, MemoryBackend) {
    let memory = MemoryBackend::new();
    let (app, state) = create_test_app_with(memory.clone());
    (app, state, memory)
}

/// Create a test app over a caller-configured in-memory backend.
#[allow(dead_code)]
pub fn create_test_app_with(memory: MemoryBackend) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        Backend::Memory(memory),
    ));
    (create_router(state.clone()), state)
}

/// A student registration with a fixed join date.
#[allow(dead_code)]
pub fn new_student(name: &str, goal: Goal) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        age: 28,
        weight: 70.5,
        goal,
        join_date: NaiveDate::from_ymd_opt(2024, 3, 1),
    }
}
