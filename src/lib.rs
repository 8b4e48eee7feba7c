// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym-Tracker: students and weekly training plans
//!
//! This crate provides the persistence layer and a thin JSON API for
//! registering gym students, building their training plans and bulk
//! importing both from CSV, over SQLite or a Google Sheets spreadsheet.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Backend;
use services::{BulkImporter, PlanRepository, StudentRepository};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub students: StudentRepository<Backend>,
    pub plans: PlanRepository<Backend>,
    pub importer: BulkImporter<Backend>,
}

impl AppState {
    /// Wire the repositories onto one storage backend.
    pub fn new(config: Config, backend: Backend) -> Self {
        let students = StudentRepository::new(backend.clone());
        let plans = PlanRepository::new(backend.clone(), students.clone());
        let importer = BulkImporter::new(backend, students.clone());

        Self {
            config,
            students,
            plans,
            importer,
        }
    }
}
