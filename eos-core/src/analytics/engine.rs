//! Aggregation engine
//!
//! The engine holds an ordered list of [`AnalyticsModule`]s and one
//! [`ChartRenderer`]. For every analysis request it runs each module over the
//! same [`Snapshot`] and charts the module's output.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     ANALYTICS ENGINE                            │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐             │
//! │  │ performance │  │   majors    │  │ attendance  │             │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘             │
//! │         │                │                │                     │
//! │         ▼                ▼                ▼                     │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              AnalyticsEngine.analyze()                  │   │
//! │  │  - Runs each module's rule over the snapshot            │   │
//! │  │  - Renders the rule output with the ChartRenderer       │   │
//! │  │  - Collects ModuleReports keyed by module name          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eos_core::analytics::create_default_engine;
//!
//! let engine = create_default_engine();
//! let snapshot = db.load_snapshot()?;
//! let report = engine.run_analysis(&snapshot, "missed_hours")?;
//!
//! for module in report.modules.iter() {
//!     println!("{}: {} categories", module.name, module.result.len());
//! }
//! ```

use super::chart::{ChartRenderer, EncodedImage, SvgBarChart};
use super::modules::{AggregationResult, AnalyticsModule};
use super::snapshot::Snapshot;
use super::statistics::{calculate_statistics, Statistics};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::time::Instant;

// ============================================
// Results
// ============================================

/// Output of one module: its aggregation plus the rendered chart.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    /// Display name of the module
    pub name: &'static str,
    /// Short identifier (config / CLI key)
    pub key: &'static str,
    /// Category → value mapping
    pub result: AggregationResult,
    /// Bar chart of `result`
    pub chart: EncodedImage,
}

/// Module reports keyed by module name, in first-registration order.
///
/// Serializes as a JSON object `{name: {name, key, result, chart}}`.
#[derive(Debug, Clone, Default)]
pub struct ModuleResults {
    entries: Vec<ModuleReport>,
}

impl ModuleResults {
    /// Insert a report; a report with the same name is replaced in place.
    fn insert(&mut self, report: ModuleReport) {
        match self.entries.iter_mut().find(|r| r.name == report.name) {
            Some(existing) => *existing = report,
            None => self.entries.push(report),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModuleReport> {
        self.entries.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|r| r.name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleReport> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ModuleResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for report in &self.entries {
            map.serialize_entry(report.name, report)?;
        }
        map.end()
    }
}

/// Everything one analysis request produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Per-module results and charts
    pub modules: ModuleResults,
    /// Statistics over `statistics_field`
    pub statistics: Statistics,
    /// Field the statistics were computed over
    pub statistics_field: String,
    /// Number of students in the snapshot
    pub student_count: usize,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================
// Analytics engine
// ============================================

/// Engine that runs aggregation modules and charts their results.
pub struct AnalyticsEngine {
    modules: Vec<AnalyticsModule>,
    renderer: Box<dyn ChartRenderer>,
}

impl AnalyticsEngine {
    /// Create an empty engine that draws with the default [`SvgBarChart`].
    pub fn new() -> Self {
        Self::with_renderer(Box::new(SvgBarChart::default()))
    }

    /// Create an empty engine with a specific renderer.
    pub fn with_renderer(renderer: Box<dyn ChartRenderer>) -> Self {
        Self {
            modules: Vec::new(),
            renderer,
        }
    }

    /// Register a module. Registering the same module twice runs it twice.
    pub fn register(&mut self, module: AnalyticsModule) {
        tracing::info!(module = module.key(), "Registered analytics module");
        self.modules.push(module);
    }

    /// Registered modules in order.
    pub fn modules(&self) -> &[AnalyticsModule] {
        &self.modules
    }

    /// Get list of registered module names.
    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Check if a module is registered, by display name or key.
    pub fn has_module(&self, name: &str) -> bool {
        self.modules
            .iter()
            .any(|m| m.name() == name || m.key() == name)
    }

    /// Run every registered module over `snapshot` and chart each result.
    ///
    /// The first rule or rendering error aborts the whole request.
    pub fn analyze(&self, snapshot: &Snapshot) -> Result<ModuleResults> {
        let mut results = ModuleResults::default();

        for module in &self.modules {
            let start = Instant::now();
            let result = module.analyze(snapshot)?;

            let spec = module.chart_spec();
            let chart = self
                .renderer
                .render(&result.chart_series(), &spec.axes(), spec.title)?;

            tracing::debug!(
                module = module.key(),
                categories = result.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Analytics module completed"
            );

            results.insert(ModuleReport {
                name: module.name(),
                key: module.key(),
                result,
                chart,
            });
        }

        Ok(results)
    }

    /// Compute statistics over `field`, then run all modules.
    ///
    /// Statistics go first so an empty snapshot or bad field fails before
    /// any chart is drawn.
    pub fn run_analysis(&self, snapshot: &Snapshot, field: &str) -> Result<AnalysisReport> {
        let start = Instant::now();
        let statistics = calculate_statistics(snapshot, field)?;
        let modules = self.analyze(snapshot)?;

        tracing::info!(
            students = snapshot.len(),
            modules = modules.len(),
            field,
            duration_ms = start.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            modules,
            statistics,
            statistics_field: field.to_string(),
            student_count: snapshot.len(),
            generated_at: Utc::now(),
        })
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}
