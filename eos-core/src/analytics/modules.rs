//! Built-in aggregation modules
//!
//! The set of analyses is fixed, so modules are variants of one enum rather
//! than trait objects. Each variant knows its name, how to aggregate a
//! [`Snapshot`], and how its result should be charted.
//!
//! - [`AnalyticsModule::PerformanceBySubject`]: average score per subject
//! - [`AnalyticsModule::CountByMajor`]: number of students per major
//! - [`AnalyticsModule::AttendanceByYear`]: total and average missed hours per year of study
//!
//! Use [`create_default_engine`] to get an engine with all of them registered.

use super::chart::{AxisLabels, SvgBarChart};
use super::engine::AnalyticsEngine;
use super::snapshot::Snapshot;
use crate::config::{AnalyticsConfig, ChartConfig};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// One aggregation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsModule {
    PerformanceBySubject,
    CountByMajor,
    AttendanceByYear,
}

/// Axis titles and chart title for a module's bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub title: &'static str,
}

impl ChartSpec {
    pub fn axes(&self) -> AxisLabels {
        AxisLabels::new(self.x_label, self.y_label)
    }
}

impl AnalyticsModule {
    /// Every built-in module in default registration order.
    pub const ALL: [AnalyticsModule; 3] = [
        AnalyticsModule::PerformanceBySubject,
        AnalyticsModule::CountByMajor,
        AnalyticsModule::AttendanceByYear,
    ];

    /// Short identifier used in config and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            AnalyticsModule::PerformanceBySubject => "performance",
            AnalyticsModule::CountByMajor => "majors",
            AnalyticsModule::AttendanceByYear => "attendance",
        }
    }

    /// Display name; results are keyed by it.
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsModule::PerformanceBySubject => "Performance by subject",
            AnalyticsModule::CountByMajor => "Students by major",
            AnalyticsModule::AttendanceByYear => "Attendance by year",
        }
    }

    pub fn chart_spec(&self) -> ChartSpec {
        match self {
            AnalyticsModule::PerformanceBySubject => ChartSpec {
                x_label: "Subject",
                y_label: "Average score",
                title: "Average score by subject",
            },
            AnalyticsModule::CountByMajor => ChartSpec {
                x_label: "Major",
                y_label: "Students",
                title: "Student distribution by major",
            },
            AnalyticsModule::AttendanceByYear => ChartSpec {
                x_label: "Year of study",
                y_label: "Missed hours",
                title: "Average missed hours by year of study",
            },
        }
    }

    /// Run this module's aggregation over a snapshot.
    pub fn analyze(&self, snapshot: &Snapshot) -> Result<AggregationResult> {
        match self {
            AnalyticsModule::PerformanceBySubject => performance_by_subject(snapshot),
            AnalyticsModule::CountByMajor => Ok(count_by_major(snapshot)),
            AnalyticsModule::AttendanceByYear => attendance_by_year(snapshot),
        }
    }
}

impl FromStr for AnalyticsModule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AnalyticsModule::ALL
            .into_iter()
            .find(|m| m.key() == s || m.name() == s)
            .ok_or_else(|| Error::Config(format!("unknown analytics module: {s}")))
    }
}

impl std::fmt::Display for AnalyticsModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================
// Results
// ============================================

/// Missed hours of one year of study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearAttendance {
    pub total_missed_hours: i64,
    pub average_missed_hours: f64,
}

/// Category → value mapping produced by a module.
///
/// Keys iterate in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregationResult {
    SubjectAverages(BTreeMap<String, f64>),
    MajorCounts(BTreeMap<String, u64>),
    YearAttendance(BTreeMap<i64, YearAttendance>),
}

impl AggregationResult {
    /// Label/value pairs to chart. Attendance charts the per-year average.
    pub fn chart_series(&self) -> Vec<(String, f64)> {
        match self {
            AggregationResult::SubjectAverages(map) => {
                map.iter().map(|(k, v)| (k.clone(), *v)).collect()
            }
            AggregationResult::MajorCounts(map) => {
                map.iter().map(|(k, v)| (k.clone(), *v as f64)).collect()
            }
            AggregationResult::YearAttendance(map) => map
                .iter()
                .map(|(year, a)| (year.to_string(), a.average_missed_hours))
                .collect(),
        }
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        match self {
            AggregationResult::SubjectAverages(map) => map.len(),
            AggregationResult::MajorCounts(map) => map.len(),
            AggregationResult::YearAttendance(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================
// Aggregations
// ============================================

fn performance_by_subject(snapshot: &Snapshot) -> Result<AggregationResult> {
    // subject -> (sum, count); a key exists only once a score was seen
    let mut totals: BTreeMap<String, (f64, u32)> = BTreeMap::new();
    for record in snapshot.records() {
        for grade in &record.grades {
            if !grade.score.is_finite() {
                return Err(Error::Validation(format!(
                    "student {} has a non-finite {} score",
                    record.id, grade.subject
                )));
            }
            let entry = totals.entry(grade.subject.clone()).or_insert((0.0, 0));
            entry.0 += grade.score;
            entry.1 += 1;
            if !entry.0.is_finite() {
                return Err(Error::Validation(format!(
                    "{} scores are too large to average",
                    grade.subject
                )));
            }
        }
    }

    Ok(AggregationResult::SubjectAverages(
        totals
            .into_iter()
            .map(|(subject, (sum, count))| (subject, sum / f64::from(count)))
            .collect(),
    ))
}

fn count_by_major(snapshot: &Snapshot) -> AggregationResult {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in snapshot.records() {
        *counts.entry(record.major.clone()).or_insert(0) += 1;
    }
    AggregationResult::MajorCounts(counts)
}

fn attendance_by_year(snapshot: &Snapshot) -> Result<AggregationResult> {
    let mut totals: BTreeMap<i64, (i64, u32)> = BTreeMap::new();
    for record in snapshot.records() {
        let entry = totals.entry(record.year).or_insert((0, 0));
        entry.0 = entry.0.checked_add(record.missed_hours).ok_or_else(|| {
            Error::Validation(format!(
                "missed hours for year {} overflow the total",
                record.year
            ))
        })?;
        entry.1 += 1;
    }

    Ok(AggregationResult::YearAttendance(
        totals
            .into_iter()
            .map(|(year, (total, count))| {
                (
                    year,
                    YearAttendance {
                        total_missed_hours: total,
                        average_missed_hours: total as f64 / f64::from(count),
                    },
                )
            })
            .collect(),
    ))
}

// ============================================
// Engine factories
// ============================================

/// Create an engine with all built-in modules registered.
///
/// ```rust,ignore
/// use eos_core::analytics::create_default_engine;
///
/// let engine = create_default_engine();
/// println!("Registered modules: {:?}", engine.module_names());
/// ```
pub fn create_default_engine() -> AnalyticsEngine {
    let mut engine = AnalyticsEngine::new();
    for module in AnalyticsModule::ALL {
        engine.register(module);
    }
    engine
}

/// Create an engine from configuration: chart size from `chart`, and every
/// built-in module except those listed in `analytics.disabled_modules`.
pub fn create_engine(analytics: &AnalyticsConfig, chart: &ChartConfig) -> Result<AnalyticsEngine> {
    chart.validate()?;

    let disabled = analytics
        .disabled_modules
        .iter()
        .map(|name| name.parse::<AnalyticsModule>())
        .collect::<Result<Vec<_>>>()?;

    let mut engine = AnalyticsEngine::with_renderer(Box::new(SvgBarChart::from_config(chart)));
    for module in AnalyticsModule::ALL {
        if disabled.contains(&module) {
            tracing::info!(module = module.key(), "Analytics module disabled by config");
            continue;
        }
        engine.register(module);
    }
    Ok(engine)
}
