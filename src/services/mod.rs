// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod google_auth;
pub mod import;
pub mod plans;
pub mod students;

pub use import::{BulkImporter, ImportResult, ImportTable};
pub use plans::PlanRepository;
pub use students::StudentRepository;
