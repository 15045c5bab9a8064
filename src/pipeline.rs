use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::config::{PageLayout, PipelineConfig, TrendConfig};
use crate::error::{ReportError, Result};
use crate::metrics::analyze_records;
use crate::models::{
    AnalyzedRecord, PerformanceReport, PerformanceSubmission, RawMarkRow, ScoreSeries, StudentRef,
    SubjectTrend,
};
use crate::normalize::normalize_rows;
use crate::report::{render_report_with, ReportDocument};
use crate::repository::MarkRepository;
use crate::trend::analyze_trend;

/// Normalizes raw rows and computes metrics for each of them.
pub fn run_analytics(raw_rows: &[RawMarkRow]) -> Result<Vec<AnalyzedRecord>> {
    let records = normalize_rows(raw_rows)?;
    analyze_records(&records)
}

/// Renders one student's records with the default page layout.
pub fn render_report(student_records: &[AnalyzedRecord]) -> Result<ReportDocument> {
    render_report_with(student_records, &PageLayout::default())
}

pub fn records_for_student(records: &[AnalyzedRecord], student_id: &str) -> Vec<AnalyzedRecord> {
    records
        .iter()
        .filter(|analyzed| analyzed.record.student_id == student_id)
        .cloned()
        .collect()
}

/// Unique students in the order they first appear.
pub fn roster(records: &[AnalyzedRecord]) -> Vec<StudentRef> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|analyzed| seen.insert(analyzed.record.student_id.clone()))
        .map(|analyzed| StudentRef {
            student_id: analyzed.record.student_id.clone(),
            student_name: analyzed.record.student_name.clone(),
        })
        .collect()
}

/// Groups percentages by (student, subject), keeping record order as
/// chronological order, and classifies each series.
pub fn subject_trends(
    records: &[AnalyzedRecord],
    config: &TrendConfig,
) -> Result<Vec<SubjectTrend>> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<(&AnalyzedRecord, Vec<f64>)> = Vec::new();

    for analyzed in records {
        let key = (
            analyzed.record.student_id.as_str(),
            analyzed.record.subject.as_str(),
        );
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((analyzed, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(analyzed.percentage);
    }

    groups
        .into_iter()
        .map(|(first, scores)| {
            let series = ScoreSeries::new(scores)?;
            let (slope, verdict) = analyze_trend(&series, config);
            Ok(SubjectTrend {
                student_id: first.record.student_id.clone(),
                student_name: first.record.student_name.clone(),
                subject: first.record.subject.clone(),
                series,
                slope,
                verdict,
            })
        })
        .collect()
}

/// Runs the analytics pipeline over an injected repository.
pub struct Pipeline<R> {
    repository: R,
    config: PipelineConfig,
}

impl<R: MarkRepository> Pipeline<R> {
    pub fn new(repository: R, config: PipelineConfig) -> Self {
        Pipeline { repository, config }
    }

    /// Validates rows before storing them, so bad rows never reach the store.
    pub fn ingest(&mut self, rows: Vec<RawMarkRow>) -> Result<usize> {
        normalize_rows(&rows)?;
        let count = rows.len();
        self.repository.put_rows(rows)?;
        info!("Stored {count} mark rows");
        Ok(count)
    }

    pub fn analyze(&self) -> Result<Vec<AnalyzedRecord>> {
        let rows = self.repository.rows()?;
        debug!("Analyzing {} stored rows", rows.len());
        run_analytics(&rows)
    }

    pub fn render_report(&self, student_records: &[AnalyzedRecord]) -> Result<ReportDocument> {
        render_report_with(student_records, &self.config.layout)
    }

    pub fn report_for_student(&self, student_id: &str) -> Result<ReportDocument> {
        let records = records_for_student(&self.analyze()?, student_id);
        if records.is_empty() {
            return Err(ReportError::StudentNotFound(student_id.to_string()));
        }
        self.render_report(&records)
    }

    pub fn subject_trends(&self, student_id: Option<&str>) -> Result<Vec<SubjectTrend>> {
        let records = self.analyze()?;
        let records = match student_id {
            Some(id) => records_for_student(&records, id),
            None => records,
        };
        subject_trends(&records, &self.config.trend)
    }

    pub fn submit_performance(&mut self, submission: PerformanceSubmission) -> Result<()> {
        validate_submission(&submission)?;
        info!(
            "Saved performance data for {} ({} scores)",
            submission.student_id,
            submission.scores.len()
        );
        self.repository.put_submission(submission)
    }

    pub fn performance_report(&self, student_id: &str) -> Result<PerformanceReport> {
        let submission = self
            .repository
            .get_submission(student_id)?
            .ok_or_else(|| ReportError::StudentNotFound(student_id.to_string()))?;

        let series = ScoreSeries::new(submission.scores.clone())?;
        let (_, verdict) = analyze_trend(&series, &self.config.trend);

        Ok(PerformanceReport {
            student_id: submission.student_id,
            subject: submission.subject,
            attendance: submission.attendance,
            participation: submission.participation,
            performance_trend: verdict,
            message: verdict.message().to_string(),
        })
    }
}

fn validate_submission(submission: &PerformanceSubmission) -> Result<()> {
    if submission.student_id.trim().is_empty() {
        return Err(ReportError::validation(0, "student_id is empty"));
    }
    if !(0.0..=100.0).contains(&submission.attendance) {
        return Err(ReportError::validation(
            0,
            format!("attendance {} outside 0..=100", submission.attendance),
        ));
    }
    if !(0.0..=1.0).contains(&submission.participation) {
        return Err(ReportError::validation(
            0,
            format!("participation {} outside 0..=1", submission.participation),
        ));
    }
    ScoreSeries::new(submission.scores.clone())?;
    Ok(())
}
