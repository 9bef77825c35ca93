//! eos - student records and grade analytics
//!
//! Command-line front end: manage students and grades, and run the analytics
//! engine over the current records.

mod records;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eos_core::{Config, Database};

use crate::records::{GradeCommand, StudentCommand};
use crate::report::AnalyzeArgs;

#[derive(Parser)]
#[command(name = "eos")]
#[command(about = "Student records and grade analytics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create, view, edit and delete students
    Students {
        #[command(subcommand)]
        action: StudentCommand,
    },
    /// Add, edit and delete grades
    Grades {
        #[command(subcommand)]
        action: GradeCommand,
    },
    /// Run the analytics modules and statistics over all students
    Analyze(AnalyzeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file; stdout carries command output)
    let _log_guard =
        eos_core::logging::init(&config.logging).context("failed to initialize logging")?;

    // Open database
    let db_path = config.resolved_database_path();
    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    db.migrate().context("failed to run database migrations")?;

    match cli.command {
        Command::Students { action } => records::run_students(&db, action),
        Command::Grades { action } => records::run_grades(&db, action),
        Command::Analyze(args) => report::run(&config, &db, &args),
    }
}
