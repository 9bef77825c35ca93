//! Integration tests for the record store and analytics pipeline
//!
//! These tests write students and grades to an on-disk database, reopen it,
//! and run the full analysis the CLI runs.

use eos_core::analytics::{
    calculate_statistics, create_default_engine, create_engine, AggregationResult,
};
use eos_core::config::{AnalyticsConfig, ChartConfig};
use eos_core::db::Database;
use eos_core::{Error, StudentDraft};
use tempfile::TempDir;

fn draft(name: &str, major: &str, year: i64, missed_hours: i64) -> StudentDraft {
    StudentDraft {
        name: name.to_string(),
        age: 20,
        email: None,
        major: major.to_string(),
        year,
        missed_hours,
    }
}

/// Two second-year students with Math and Science grades.
fn seed(db: &Database) -> (i64, i64) {
    let john = db
        .create_student(&draft("John Doe", "Computer Science", 2, 10))
        .unwrap();
    let jane = db
        .create_student(&draft("Jane Roe", "Mathematics", 2, 90))
        .unwrap();
    db.create_grade(john, "Math", 85.0).unwrap();
    db.create_grade(john, "Science", 90.0).unwrap();
    db.create_grade(jane, "Math", 90.0).unwrap();
    db.create_grade(jane, "Science", 100.0).unwrap();
    (john, jane)
}

fn open_temp_db(dir: &TempDir) -> Database {
    let db = Database::open(&dir.path().join("eos.db")).expect("failed to open database");
    db.migrate().expect("failed to migrate");
    db
}

// ============================================
// Persistence
// ============================================

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let (john, _) = {
        let db = open_temp_db(&dir);
        seed(&db)
    };

    let db = open_temp_db(&dir);
    let students = db.list_students().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0].name, "John Doe");
    assert_eq!(db.list_grades(john).unwrap().len(), 2);
}

#[test]
fn test_delete_student_cascades_on_disk() {
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);
    let (john, jane) = seed(&db);

    db.delete_student(john).unwrap();

    assert!(db.list_grades(john).unwrap().is_empty());
    assert_eq!(db.list_grades(jane).unwrap().len(), 2);
    let snapshot = db.load_snapshot().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.records()[0].grades.len(), 2);
}

// ============================================
// Analysis over stored data
// ============================================

#[test]
fn test_full_analysis_over_stored_records() {
    eos_core::logging::init_test();
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);
    seed(&db);

    let snapshot = db.load_snapshot().unwrap();
    let report = create_default_engine()
        .run_analysis(&snapshot, "missed_hours")
        .unwrap();

    assert_eq!(report.student_count, 2);
    assert_eq!(report.statistics.sum, 100.0);
    assert_eq!(report.statistics.mean, 50.0);

    match &report.modules.get("Performance by subject").unwrap().result {
        AggregationResult::SubjectAverages(map) => {
            assert_eq!(map["Math"], 87.5);
            assert_eq!(map["Science"], 95.0);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    match &report.modules.get("Students by major").unwrap().result {
        AggregationResult::MajorCounts(map) => {
            assert_eq!(map["Computer Science"], 1);
            assert_eq!(map["Mathematics"], 1);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    match &report.modules.get("Attendance by year").unwrap().result {
        AggregationResult::YearAttendance(map) => {
            assert_eq!(map[&2].average_missed_hours, 50.0);
            assert_eq!(map[&2].total_missed_hours, 100);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    for module in report.modules.iter() {
        let svg = String::from_utf8(module.chart.decode().unwrap()).unwrap();
        assert!(svg.starts_with("<svg"), "{} chart is not SVG", module.name);
    }
}

#[test]
fn test_edits_are_visible_to_next_analysis() {
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);
    let (john, _) = seed(&db);

    let mut changed = StudentDraft::from(&db.get_student(john).unwrap().unwrap());
    changed.missed_hours = 30;
    db.update_student(john, &changed).unwrap();

    let stats = calculate_statistics(&db.load_snapshot().unwrap(), "missed_hours").unwrap();
    assert_eq!(stats.sum, 120.0);
    assert_eq!(stats.min, 30.0);
}

#[test]
fn test_analysis_of_empty_store_fails_explicitly() {
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);

    let err = create_default_engine()
        .run_analysis(&db.load_snapshot().unwrap(), "missed_hours")
        .unwrap_err();
    assert!(matches!(err, Error::EmptySnapshot));
}

#[test]
fn test_configured_engine_respects_disabled_modules_and_size() {
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);
    seed(&db);

    let analytics = AnalyticsConfig {
        disabled_modules: vec!["performance".to_string(), "attendance".to_string()],
        ..Default::default()
    };
    let chart = ChartConfig {
        width: 320,
        height: 200,
    };
    let engine = create_engine(&analytics, &chart).unwrap();
    let report = engine
        .run_analysis(&db.load_snapshot().unwrap(), "age")
        .unwrap();

    assert_eq!(report.modules.names(), vec!["Students by major"]);
    let svg = String::from_utf8(
        report
            .modules
            .get("Students by major")
            .unwrap()
            .chart
            .decode()
            .unwrap(),
    )
    .unwrap();
    assert!(svg.contains(r#"width="320""#));
}

#[test]
fn test_oversized_attendance_totals_fail_cleanly() {
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);
    db.create_student(&draft("John Doe", "Physics", 1, i64::MAX))
        .unwrap();
    db.create_student(&draft("Jane Roe", "Physics", 1, i64::MAX))
        .unwrap();

    let err = create_default_engine()
        .analyze(&db.load_snapshot().unwrap())
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
