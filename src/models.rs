use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// A numeric cell as it arrives from a data source, before coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Float(value)
    }
}

impl From<i64> for RawNumber {
    fn from(value: i64) -> Self {
        RawNumber::Int(value)
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

/// One unvalidated row from the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarkRow {
    pub student_id: String,
    pub student_name: String,
    pub subject: String,
    pub marks: RawNumber,
    pub max_marks: RawNumber,
}

impl RawMarkRow {
    pub fn new(
        student_id: &str,
        student_name: &str,
        subject: &str,
        marks: impl Into<RawNumber>,
        max_marks: impl Into<RawNumber>,
    ) -> Self {
        RawMarkRow {
            student_id: student_id.to_string(),
            student_name: student_name.to_string(),
            subject: subject.to_string(),
            marks: marks.into(),
            max_marks: max_marks.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkRecord {
    pub student_id: String,
    pub student_name: String,
    pub subject: String,
    pub marks: f64,
    pub max_marks: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    F,
    C,
    B,
    A,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::F => "F",
            Grade::C => "C",
            Grade::B => "B",
            Grade::A => "A",
        };
        f.write_str(letter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pass,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => f.write_str("Pass"),
            Status::Fail => f.write_str("Fail"),
        }
    }
}

/// A mark record enriched with the metrics derived from it.
///
/// Only [`crate::metrics::analyze_record`] builds these, so the derived
/// fields always agree with `record`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedRecord {
    #[serde(flatten)]
    pub record: MarkRecord,
    pub percentage: f64,
    pub grade: Grade,
    pub status: Status,
    pub recommendation: String,
}

/// Scores for one (student, subject) pair in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSeries {
    scores: Vec<f64>,
}

impl ScoreSeries {
    pub fn new(scores: Vec<f64>) -> Result<Self> {
        if let Some(position) = scores.iter().position(|score| !score.is_finite()) {
            return Err(ReportError::validation(
                position,
                "score series contains a non-finite value",
            ));
        }
        Ok(ScoreSeries { scores })
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendVerdict {
    Declining,
    Stable,
    Improving,
    InsufficientData,
}

impl TrendVerdict {
    pub fn message(&self) -> &'static str {
        match self {
            TrendVerdict::Declining => "Declining performance, needs attention",
            TrendVerdict::Stable => "Stable, but no improvement",
            TrendVerdict::Improving => "Improving performance",
            TrendVerdict::InsufficientData => "Insufficient data",
        }
    }
}

impl fmt::Display for TrendVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendVerdict::Declining => "Declining",
            TrendVerdict::Stable => "Stable",
            TrendVerdict::Improving => "Improving",
            TrendVerdict::InsufficientData => "InsufficientData",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectTrend {
    pub student_id: String,
    pub student_name: String,
    pub subject: String,
    pub series: ScoreSeries,
    pub slope: Option<f64>,
    pub verdict: TrendVerdict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRef {
    pub student_id: String,
    pub student_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub student_id: String,
    pub student_name: String,
    pub subject_count: usize,
    pub average_percentage: f64,
    pub passed: usize,
    pub failed: usize,
}

/// Self-reported progress for one subject, submitted outside the marks table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSubmission {
    pub student_id: String,
    pub subject: String,
    pub scores: Vec<f64>,
    /// Percentage, 0 to 100.
    pub attendance: f64,
    /// Engagement level, 0 to 1.
    pub participation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub student_id: String,
    pub subject: String,
    pub attendance: f64,
    pub participation: f64,
    pub performance_trend: TrendVerdict,
    pub message: String,
}
