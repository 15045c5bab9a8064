#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("validation error in row {row}: {reason}")]
    Validation { row: usize, reason: String },

    #[error("invalid record for {student_id}/{subject}: {reason}")]
    InvalidRecord {
        student_id: String,
        subject: String,
        reason: String,
    },

    #[error("cannot render a report with no records")]
    EmptyReport,

    #[error("report for {expected} also contains records of {found}")]
    MixedStudents { expected: String, found: String },

    #[error("invalid page layout: {0}")]
    InvalidLayout(String),

    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn validation(row: usize, reason: impl Into<String>) -> Self {
        ReportError::Validation {
            row,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
