//! Database layer for eos
//!
//! This module provides the record store using SQLite with:
//! - Schema migrations
//! - Repository pattern for student and grade CRUD
//! - Snapshot assembly for analytics

pub mod repo;
pub mod schema;

pub use repo::Database;
