//! Turns per-subject mark rows into per-student analytics and lays them out
//! as a paginated report.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod repository;
pub mod source;
pub mod trend;

pub use config::{PageLayout, PipelineConfig, TrendConfig};
pub use error::{ReportError, Result};
pub use models::{
    AnalyzedRecord, Grade, MarkRecord, PerformanceReport, PerformanceSubmission, RawMarkRow,
    RawNumber, ScoreSeries, Status, StudentRef, StudentSummary, SubjectTrend, TrendVerdict,
};
pub use pipeline::{render_report, run_analytics, Pipeline};
pub use report::{LineKind, ReportDocument};
pub use repository::{InMemoryRepository, MarkRepository};
