use std::collections::HashMap;

use crate::error::Result;
use crate::models::{PerformanceSubmission, RawMarkRow};

/// Storage the pipeline reads marks from and writes submissions to.
pub trait MarkRepository {
    fn put_rows(&mut self, rows: Vec<RawMarkRow>) -> Result<()>;

    fn rows(&self) -> Result<Vec<RawMarkRow>>;

    /// Stores a submission, replacing any earlier one for the same student.
    fn put_submission(&mut self, submission: PerformanceSubmission) -> Result<()>;

    fn get_submission(&self, student_id: &str) -> Result<Option<PerformanceSubmission>>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    rows: Vec<RawMarkRow>,
    submissions: HashMap<String, PerformanceSubmission>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<RawMarkRow>) -> Self {
        InMemoryRepository {
            rows,
            submissions: HashMap::new(),
        }
    }
}

impl MarkRepository for InMemoryRepository {
    fn put_rows(&mut self, rows: Vec<RawMarkRow>) -> Result<()> {
        self.rows.extend(rows);
        Ok(())
    }

    fn rows(&self) -> Result<Vec<RawMarkRow>> {
        Ok(self.rows.clone())
    }

    fn put_submission(&mut self, submission: PerformanceSubmission) -> Result<()> {
        self.submissions
            .insert(submission.student_id.clone(), submission);
        Ok(())
    }

    fn get_submission(&self, student_id: &str) -> Result<Option<PerformanceSubmission>> {
        Ok(self.submissions.get(student_id).cloned())
    }
}
