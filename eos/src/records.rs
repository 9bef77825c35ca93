//! `eos students` and `eos grades` subcommands.

use anyhow::{Context, Result};
use clap::Subcommand;
use eos_core::format::{format_number, format_relative_time};
use eos_core::{Database, Student, StudentDraft};

#[derive(Subcommand)]
pub enum StudentCommand {
    /// List students, optionally filtered by id or name fragment
    List {
        /// All digits match an id; anything else matches names case-insensitively
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Show one student with their grades
    Show { id: i64 },
    /// Add a student
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: i64,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        major: String,
        /// Year of study (1 or more)
        #[arg(long)]
        year: i64,
        #[arg(long, default_value_t = 0)]
        missed_hours: i64,
    },
    /// Change some fields of a student; omitted fields keep their value
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<i64>,
        /// Pass an empty string to clear the email
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        major: Option<String>,
        #[arg(long)]
        year: Option<i64>,
        #[arg(long)]
        missed_hours: Option<i64>,
    },
    /// Delete a student and all of their grades
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum GradeCommand {
    /// Record a grade for a student
    Add {
        student_id: i64,
        #[arg(long)]
        subject: String,
        #[arg(long, allow_negative_numbers = true)]
        score: f64,
    },
    /// Change the subject and/or score of a grade
    Edit {
        grade_id: i64,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        score: Option<f64>,
    },
    /// Delete a grade
    Delete { grade_id: i64 },
}

pub fn run_students(db: &Database, command: StudentCommand) -> Result<()> {
    match command {
        StudentCommand::List { query } => {
            let students = match query.as_deref() {
                Some(q) => db.search_students(q)?,
                None => db.list_students()?,
            };
            print_student_table(&students);
        }
        StudentCommand::Show { id } => {
            let student = db
                .get_student(id)?
                .ok_or(eos_core::Error::StudentNotFound(id))?;
            let grades = db.list_grades(id)?;
            print_student_details(&student);
            println!();
            if grades.is_empty() {
                println!("No grades recorded.");
            } else {
                println!("Grades:");
                for grade in &grades {
                    println!(
                        "  #{:<5} {:<20} {}",
                        grade.id,
                        grade.subject,
                        format_number(grade.score)
                    );
                }
            }
        }
        StudentCommand::Add {
            name,
            age,
            email,
            major,
            year,
            missed_hours,
        } => {
            let draft = StudentDraft {
                name,
                age,
                email,
                major,
                year,
                missed_hours,
            };
            let id = db.create_student(&draft).context("failed to add student")?;
            println!("Added student {id}");
        }
        StudentCommand::Edit {
            id,
            name,
            age,
            email,
            major,
            year,
            missed_hours,
        } => {
            let student = db
                .get_student(id)?
                .ok_or(eos_core::Error::StudentNotFound(id))?;
            let mut draft = StudentDraft::from(&student);
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(age) = age {
                draft.age = age;
            }
            if let Some(email) = email {
                draft.email = Some(email);
            }
            if let Some(major) = major {
                draft.major = major;
            }
            if let Some(year) = year {
                draft.year = year;
            }
            if let Some(missed_hours) = missed_hours {
                draft.missed_hours = missed_hours;
            }
            db.update_student(id, &draft)
                .with_context(|| format!("failed to update student {id}"))?;
            println!("Updated student {id}");
        }
        StudentCommand::Delete { id } => {
            db.delete_student(id)
                .with_context(|| format!("failed to delete student {id}"))?;
            println!("Deleted student {id}");
        }
    }
    Ok(())
}

pub fn run_grades(db: &Database, command: GradeCommand) -> Result<()> {
    match command {
        GradeCommand::Add {
            student_id,
            subject,
            score,
        } => {
            let id = db
                .create_grade(student_id, &subject, score)
                .with_context(|| format!("failed to add grade for student {student_id}"))?;
            println!("Added grade {id}");
        }
        GradeCommand::Edit {
            grade_id,
            subject,
            score,
        } => {
            let grade = db
                .get_grade(grade_id)?
                .ok_or(eos_core::Error::GradeNotFound(grade_id))?;
            let subject = subject.unwrap_or(grade.subject);
            let score = score.unwrap_or(grade.score);
            db.update_grade(grade_id, &subject, score)
                .with_context(|| format!("failed to update grade {grade_id}"))?;
            println!("Updated grade {grade_id}");
        }
        GradeCommand::Delete { grade_id } => {
            db.delete_grade(grade_id)
                .with_context(|| format!("failed to delete grade {grade_id}"))?;
            println!("Deleted grade {grade_id}");
        }
    }
    Ok(())
}

fn print_student_table(students: &[Student]) {
    if students.is_empty() {
        println!("No students found.");
        return;
    }

    println!(
        "{:<6} {:<24} {:>4} {:<22} {:>4} {:>6}  {}",
        "ID", "Name", "Age", "Major", "Year", "Missed", "Email"
    );
    for s in students {
        println!(
            "{:<6} {:<24} {:>4} {:<22} {:>4} {:>6}  {}",
            s.id,
            truncate(&s.name, 24),
            s.age,
            truncate(&s.major, 22),
            s.year,
            s.missed_hours,
            s.email.as_deref().unwrap_or("-")
        );
    }
    println!("\n{} student(s)", students.len());
}

fn print_student_details(s: &Student) {
    println!("Student #{}", s.id);
    println!("  Name:         {}", s.name);
    println!("  Age:          {}", s.age);
    println!("  Email:        {}", s.email.as_deref().unwrap_or("-"));
    println!("  Major:        {}", s.major);
    println!("  Year:         {}", s.year);
    println!("  Missed hours: {}", s.missed_hours);
    println!("  Updated:      {}", format_relative_time(s.updated_at));
}

/// Shorten `text` to at most `max` characters, marking the cut with `…`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
