//! Analytics over student records
//!
//! Every analysis runs over a [`Snapshot`]: a read-only, point-in-time list of
//! students with their grades, loaded fresh from the store per request.
//!
//! - [`engine`]: the [`AnalyticsEngine`] that runs registered modules
//! - [`modules`]: the built-in aggregation rules
//! - [`statistics`]: sum/mean/median/max/min over one numeric field
//! - [`chart`]: bar chart rendering to base64-encoded images

pub mod chart;
pub mod engine;
pub mod modules;
pub mod snapshot;
pub mod statistics;

pub use chart::{AxisLabels, ChartRenderer, EncodedImage, SvgBarChart};
pub use engine::{AnalysisReport, AnalyticsEngine, ModuleReport, ModuleResults};
pub use modules::{
    create_default_engine, create_engine, AggregationResult, AnalyticsModule, ChartSpec,
    YearAttendance,
};
pub use snapshot::{GradeEntry, Snapshot, StudentSnapshot, NUMERIC_FIELDS};
pub use statistics::{calculate_statistics, Statistics};
