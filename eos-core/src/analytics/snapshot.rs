//! Read-only student+grade snapshot consumed by the analytics layer.

use crate::error::{Error, Result};
use crate::types::{Grade, Student};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every field name a snapshot record exposes.
pub(crate) const SNAPSHOT_FIELDS: &[&str] = &[
    "id",
    "name",
    "age",
    "grades",
    "email",
    "major",
    "year",
    "missed_hours",
];

/// Fields [`StudentSnapshot::numeric_field`] can read.
pub const NUMERIC_FIELDS: &[&str] = &["id", "age", "year", "missed_hours"];

/// Check that `field` names a numeric snapshot field without needing a record.
pub fn ensure_numeric_field(field: &str) -> Result<()> {
    if NUMERIC_FIELDS.contains(&field) {
        Ok(())
    } else {
        Err(non_numeric_field_error(field))
    }
}

fn non_numeric_field_error(field: &str) -> Error {
    if SNAPSHOT_FIELDS.contains(&field) {
        Error::Validation(format!("field '{field}' is not numeric"))
    } else {
        Error::FieldNotFound(field.to_string())
    }
}

/// Subject and score of one grade, as seen by analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub subject: String,
    pub score: f64,
}

/// One flattened student with its grades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSnapshot {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub grades: Vec<GradeEntry>,
    pub email: Option<String>,
    pub major: String,
    pub year: i64,
    pub missed_hours: i64,
}

impl StudentSnapshot {
    /// Numeric value of a field by name.
    ///
    /// Unknown names fail with [`Error::FieldNotFound`]; text and list fields
    /// fail with [`Error::Validation`].
    pub fn numeric_field(&self, field: &str) -> Result<f64> {
        match field {
            "id" => Ok(self.id as f64),
            "age" => Ok(self.age as f64),
            "year" => Ok(self.year as f64),
            "missed_hours" => Ok(self.missed_hours as f64),
            other => Err(non_numeric_field_error(other)),
        }
    }
}

/// Point-in-time list of students with their grades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: Vec<StudentSnapshot>,
}

impl Snapshot {
    pub fn new(records: Vec<StudentSnapshot>) -> Self {
        Self { records }
    }

    /// Join students with their grades, keeping the given orders.
    ///
    /// Grades whose student is absent are dropped; the store's foreign key
    /// keeps that from happening for loaded data.
    pub fn assemble(students: Vec<Student>, grades: Vec<Grade>) -> Self {
        let mut by_student: HashMap<i64, Vec<GradeEntry>> = HashMap::new();
        for grade in grades {
            by_student.entry(grade.student_id).or_default().push(GradeEntry {
                subject: grade.subject,
                score: grade.score,
            });
        }

        let records = students
            .into_iter()
            .map(|s| StudentSnapshot {
                grades: by_student.remove(&s.id).unwrap_or_default(),
                id: s.id,
                name: s.name,
                age: s.age,
                email: s.email,
                major: s.major,
                year: s.year,
                missed_hours: s.missed_hours,
            })
            .collect();

        Self { records }
    }

    pub fn records(&self) -> &[StudentSnapshot] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
