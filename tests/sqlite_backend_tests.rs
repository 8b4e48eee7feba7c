// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Repositories over the SQLite backend.

use gym_tracker::db::{Backend, Collection, SqliteBackend, StorageBackend};
use gym_tracker::error::AppError;
use gym_tracker::models::{Day, Goal, NewPlanEntry};
use gym_tracker::services::{BulkImporter, ImportTable, PlanRepository, StudentRepository};
use std::path::PathBuf;

mod common;

fn temp_db_path(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join(format!("gym-tracker-{}-{}-{}", tag, std::process::id(), nanos))
        .join("gym.sqlite3")
}

#[tokio::test]
async fn test_student_and_plan_flow() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let students = StudentRepository::new(backend.clone());
    let plans = PlanRepository::new(backend.clone(), students.clone());

    let ana = students
        .create(common::new_student("Ana", Goal::Strength))
        .await
        .unwrap();
    assert_eq!(ana.id, 1);
    assert_eq!(students.by_id(1).await.unwrap(), Some(ana.clone()));

    for (exercise, day) in [("Bench", Day::Wednesday), ("Squat", Day::Monday)] {
        plans
            .add_entry(NewPlanEntry {
                student_id: ana.id,
                exercise: exercise.to_string(),
                sets: 3,
                reps: "10".to_string(),
                day,
            })
            .await
            .unwrap();
    }

    let plan = plans.list_for_student(ana.id).await.unwrap();
    let names: Vec<&str> = plan.iter().map(|e| e.exercise.as_str()).collect();
    assert_eq!(names, ["Squat", "Bench"]);
}

#[tokio::test]
async fn test_import_through_backend_enum() {
    let backend = Backend::Sqlite(SqliteBackend::open_in_memory().unwrap());
    let students = StudentRepository::new(backend.clone());
    let importer = BulkImporter::new(backend.clone(), students.clone());

    let table = ImportTable::parse_csv(
        "nombre,edad,peso,objetivo,fecha_ingreso\nAna,28,61.5,Fuerza,2024-01-15\nLeo,34,80,Resistencia,2024-02-01\n",
    );
    let result = importer.import_students(&table).await.unwrap();
    assert_eq!(result.first_id, Some(1));
    assert!(backend.supports_batch_append());

    let next = students
        .create(common::new_student("Marta", Goal::Hypertrophy))
        .await
        .unwrap();
    assert_eq!(next.id, 3);
    assert_eq!(students.list_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_non_finite_weight_is_a_row_error() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let students = StudentRepository::new(backend.clone());
    let importer = BulkImporter::new(backend.clone(), students.clone());

    let table = ImportTable::parse_csv(
        "nombre,edad,peso,objetivo,fecha_ingreso\nLeo,34,80,Fuerza,\nAna,28,inf,Fuerza,\nMarta,40,NaN,Fuerza,\n",
    );
    let err = importer.import_students(&table).await.unwrap_err();

    assert!(matches!(err, AppError::Import { row: 2, .. }));
    assert!(backend.read_all(Collection::Alumnos).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reopened_file_keeps_rows_and_sequence() {
    let path = temp_db_path("reopen");

    {
        let students = StudentRepository::new(SqliteBackend::open(&path).unwrap());
        students
            .create(common::new_student("Ana", Goal::Strength))
            .await
            .unwrap();
        students
            .create(common::new_student("Leo", Goal::Endurance))
            .await
            .unwrap();
    }

    let students = StudentRepository::new(SqliteBackend::open(&path).unwrap());
    let all = students.list_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].name, "Leo");

    let marta = students
        .create(common::new_student("Marta", Goal::WeightLoss))
        .await
        .unwrap();
    assert_eq!(marta.id, 3);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
