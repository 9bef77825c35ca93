//! Core domain types for eos
//!
//! These types mirror the two tables of the record store.
//!
//! | Term | Definition |
//! |------|------------|
//! | **Student** | An enrolled person with a major, a year of study and a missed-hours tally |
//! | **Grade** | One score a student received in one subject |
//! | **Draft** | Field values submitted for create/update, validated before they reach SQL |

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Student
// ============================================

/// A stored student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Identity assigned by the store
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
    pub major: String,
    /// Year of study, starting at 1
    pub year: i64,
    pub missed_hours: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field values for creating or updating a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
    pub major: String,
    pub year: i64,
    #[serde(default)]
    pub missed_hours: i64,
}

impl StudentDraft {
    /// Check required fields and ranges, returning a normalized copy.
    ///
    /// Names and majors are trimmed; a blank email becomes `None`.
    pub fn validate(&self) -> Result<StudentDraft> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("name must not be blank".to_string()));
        }
        let major = self.major.trim();
        if major.is_empty() {
            return Err(Error::Validation("major must not be blank".to_string()));
        }
        if self.age < 0 {
            return Err(Error::Validation(format!(
                "age must not be negative (got {})",
                self.age
            )));
        }
        if self.year < 1 {
            return Err(Error::Validation(format!(
                "year must be at least 1 (got {})",
                self.year
            )));
        }
        if self.missed_hours < 0 {
            return Err(Error::Validation(format!(
                "missed_hours must not be negative (got {})",
                self.missed_hours
            )));
        }

        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(email) if is_plausible_email(email) => Some(email.to_string()),
            Some(email) => {
                return Err(Error::Validation(format!("email is not valid: {email}")));
            }
        };

        Ok(StudentDraft {
            name: name.to_string(),
            age: self.age,
            email,
            major: major.to_string(),
            year: self.year,
            missed_hours: self.missed_hours,
        })
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            age: student.age,
            email: student.email.clone(),
            major: student.major.clone(),
            year: student.year,
            missed_hours: student.missed_hours,
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        _ => false,
    }
}

// ============================================
// Grade
// ============================================

/// A stored grade belonging to one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub subject: String,
    pub score: f64,
}

/// Validate a subject/score pair, returning the trimmed subject.
pub fn validate_grade(subject: &str, score: f64) -> Result<String> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(Error::Validation("subject must not be blank".to_string()));
    }
    if !score.is_finite() {
        return Err(Error::Validation(format!(
            "score must be a finite number (got {score})"
        )));
    }
    Ok(subject.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> StudentDraft {
        StudentDraft {
            name: "  John Doe ".to_string(),
            age: 20,
            email: Some("john.doe@example.com".to_string()),
            major: "Computer Science".to_string(),
            year: 2,
            missed_hours: 5,
        }
    }

    #[test]
    fn test_validate_trims_and_keeps_fields() {
        let normalized = draft().validate().unwrap();
        assert_eq!(normalized.name, "John Doe");
        assert_eq!(normalized.email.as_deref(), Some("john.doe@example.com"));
        assert_eq!(normalized.missed_hours, 5);
    }

    #[test]
    fn test_blank_email_becomes_none() {
        let mut d = draft();
        d.email = Some("   ".to_string());
        assert_eq!(d.validate().unwrap().email, None);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let mut d = draft();
        d.name = " ".to_string();
        assert!(matches!(d.validate(), Err(Error::Validation(_))));

        let mut d = draft();
        d.missed_hours = -1;
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("missed_hours"));

        let mut d = draft();
        d.year = 0;
        assert!(d.validate().is_err());

        let mut d = draft();
        d.email = Some("not-an-email".to_string());
        assert!(d.validate().is_err());

        let mut d = draft();
        d.email = Some("a@b@c".to_string());
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_validate_grade() {
        assert_eq!(validate_grade(" Math ", 90.0).unwrap(), "Math");
        assert!(validate_grade("", 90.0).is_err());
        assert!(validate_grade("Math", f64::NAN).is_err());
        assert!(validate_grade("Math", f64::INFINITY).is_err());
    }
}
