//! # eos-core
//!
//! Core library for eos, a student records store with an analytics layer.
//!
//! This library provides:
//! - Domain types for students and grades, with input validation
//! - Database storage layer with SQLite
//! - Aggregation modules, descriptive statistics and bar charts
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use eos_core::analytics::create_default_engine;
//! use eos_core::{Config, Database};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open database
//! let db = Database::open(&config.resolved_database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! // Analyze the current records
//! let snapshot = db.load_snapshot().expect("failed to load snapshot");
//! let report = create_default_engine()
//!     .run_analysis(&snapshot, &config.analytics.statistics_field)
//!     .expect("analysis failed");
//! println!("{}", report.to_json().expect("serialization failed"));
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod types;
