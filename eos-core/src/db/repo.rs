//! Database repository layer
//!
//! Provides query and insert operations for students and grades.

use crate::analytics::Snapshot;
use crate::error::{Error, Result};
use crate::types::*;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Database handle (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Cascade-delete of grades depends on foreign keys being enforced
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.connection();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a half-applied statement behind.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ============================================
    // Student operations
    // ============================================

    /// Insert a new student, returning its id
    pub fn create_student(&self, draft: &StudentDraft) -> Result<i64> {
        let draft = draft.validate()?;
        let now = Utc::now().to_rfc3339();
        let conn = self.connection();
        conn.execute(
            r#"
            INSERT INTO students (name, age, email, major, year, missed_hours, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            params![
                draft.name,
                draft.age,
                draft.email,
                draft.major,
                draft.year,
                draft.missed_hours,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(student_id = id, name = %draft.name, "Created student");
        Ok(id)
    }

    /// Replace all editable fields of a student
    pub fn update_student(&self, id: i64, draft: &StudentDraft) -> Result<()> {
        let draft = draft.validate()?;
        let conn = self.connection();
        let changed = conn.execute(
            r#"
            UPDATE students
            SET name = ?1, age = ?2, email = ?3, major = ?4, year = ?5,
                missed_hours = ?6, updated_at = ?7
            WHERE id = ?8
            "#,
            params![
                draft.name,
                draft.age,
                draft.email,
                draft.major,
                draft.year,
                draft.missed_hours,
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::StudentNotFound(id));
        }
        tracing::debug!(student_id = id, "Updated student");
        Ok(())
    }

    /// Delete a student together with all of its grades
    pub fn delete_student(&self, id: i64) -> Result<()> {
        let conn = self.connection();
        let changed = conn.execute("DELETE FROM students WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(Error::StudentNotFound(id));
        }
        tracing::debug!(student_id = id, "Deleted student");
        Ok(())
    }

    /// Get a student by ID
    pub fn get_student(&self, id: i64) -> Result<Option<Student>> {
        let conn = self.connection();
        conn.query_row("SELECT * FROM students WHERE id = ?", [id], |row| {
            Self::row_to_student(row)
        })
        .optional()
        .map_err(Error::from)
    }

    /// List all students ordered by id
    pub fn list_students(&self) -> Result<Vec<Student>> {
        let conn = self.connection();
        Self::query_students(&conn)
    }

    /// Find students by id (all-digit query) or by case-insensitive name fragment.
    ///
    /// A blank query lists everyone.
    pub fn search_students(&self, query: &str) -> Result<Vec<Student>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_students();
        }

        let conn = self.connection();
        if query.chars().all(|c| c.is_ascii_digit()) {
            let Ok(id) = query.parse::<i64>() else {
                return Ok(vec![]);
            };
            let mut stmt = conn.prepare("SELECT * FROM students WHERE id = ?")?;
            let students = stmt
                .query_map([id], Self::row_to_student)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            return Ok(students);
        }

        // LIKE is case-insensitive for ASCII only; lowercase both sides for the rest.
        let needle = query.to_lowercase();
        let students = Self::query_students(&conn)?
            .into_iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect();
        Ok(students)
    }

    fn query_students(conn: &Connection) -> Result<Vec<Student>> {
        let mut stmt = conn.prepare("SELECT * FROM students ORDER BY id")?;
        let students = stmt
            .query_map([], Self::row_to_student)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(students)
    }

    fn row_to_student(row: &Row) -> rusqlite::Result<Student> {
        let created_at_str: String = row.get("created_at")?;
        let updated_at_str: String = row.get("updated_at")?;

        Ok(Student {
            id: row.get("id")?,
            name: row.get("name")?,
            age: row.get("age")?,
            email: row.get("email")?,
            major: row.get("major")?,
            year: row.get("year")?,
            missed_hours: row.get("missed_hours")?,
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }

    // ============================================
    // Grade operations
    // ============================================

    /// Add a grade to an existing student, returning the grade id
    pub fn create_grade(&self, student_id: i64, subject: &str, score: f64) -> Result<i64> {
        let subject = validate_grade(subject, score)?;
        let conn = self.connection();
        if !Self::student_exists(&conn, student_id)? {
            return Err(Error::StudentNotFound(student_id));
        }
        conn.execute(
            "INSERT INTO grades (student_id, subject, score) VALUES (?1, ?2, ?3)",
            params![student_id, subject, score],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(student_id, grade_id = id, %subject, score, "Created grade");
        Ok(id)
    }

    /// Change the subject and score of a grade
    pub fn update_grade(&self, id: i64, subject: &str, score: f64) -> Result<()> {
        let subject = validate_grade(subject, score)?;
        let conn = self.connection();
        let changed = conn.execute(
            "UPDATE grades SET subject = ?1, score = ?2 WHERE id = ?3",
            params![subject, score, id],
        )?;
        if changed == 0 {
            return Err(Error::GradeNotFound(id));
        }
        tracing::debug!(grade_id = id, "Updated grade");
        Ok(())
    }

    /// Remove a single grade
    pub fn delete_grade(&self, id: i64) -> Result<()> {
        let conn = self.connection();
        let changed = conn.execute("DELETE FROM grades WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(Error::GradeNotFound(id));
        }
        tracing::debug!(grade_id = id, "Deleted grade");
        Ok(())
    }

    /// Get a grade by ID
    pub fn get_grade(&self, id: i64) -> Result<Option<Grade>> {
        let conn = self.connection();
        conn.query_row("SELECT * FROM grades WHERE id = ?", [id], Self::row_to_grade)
            .optional()
            .map_err(Error::from)
    }

    /// List the grades of one student ordered by grade id
    pub fn list_grades(&self, student_id: i64) -> Result<Vec<Grade>> {
        let conn = self.connection();
        let mut stmt = conn.prepare("SELECT * FROM grades WHERE student_id = ? ORDER BY id")?;
        let grades = stmt
            .query_map([student_id], Self::row_to_grade)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(grades)
    }

    fn student_exists(conn: &Connection, id: i64) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM students WHERE id = ?",
            [id],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    fn row_to_grade(row: &Row) -> rusqlite::Result<Grade> {
        Ok(Grade {
            id: row.get("id")?,
            student_id: row.get("student_id")?,
            subject: row.get("subject")?,
            score: row.get("score")?,
        })
    }

    // ============================================
    // Snapshot
    // ============================================

    /// Assemble the student+grade snapshot analytics run over.
    ///
    /// Both tables are read under one lock so the snapshot reflects a single
    /// point in time.
    pub fn load_snapshot(&self) -> Result<Snapshot> {
        let conn = self.connection();
        let students = Self::query_students(&conn)?;

        let mut stmt = conn.prepare("SELECT * FROM grades ORDER BY id")?;
        let grades = stmt
            .query_map([], Self::row_to_grade)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let snapshot = Snapshot::assemble(students, grades);
        tracing::debug!(records = snapshot.len(), "Loaded analytics snapshot");
        Ok(snapshot)
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
