use std::collections::HashMap;

use log::debug;

use crate::error::{ReportError, Result};
use crate::models::{AnalyzedRecord, Grade, MarkRecord, Status, StudentSummary};

pub const PASS_MARK: f64 = 40.0;

pub const EXCELLENT_MESSAGE: &str = "Excellent performance! Keep up the great work!";
pub const GOOD_MESSAGE: &str = "Good work, but try to improve further.";
pub const IMPROVE_MESSAGE: &str = "Needs improvement. Focus on weak areas.";
pub const CRITICAL_MESSAGE: &str = "Critical! Requires immediate attention.";

pub fn analyze_record(record: &MarkRecord) -> Result<AnalyzedRecord> {
    let invalid = |reason: String| ReportError::InvalidRecord {
        student_id: record.student_id.clone(),
        subject: record.subject.clone(),
        reason,
    };

    if record.max_marks == 0.0 {
        return Err(invalid("max_marks is zero".to_string()));
    }
    if !record.max_marks.is_finite() || record.max_marks < 0.0 {
        return Err(invalid(format!("max_marks {} is not positive", record.max_marks)));
    }
    if !record.marks.is_finite() || record.marks < 0.0 || record.marks > record.max_marks {
        return Err(invalid(format!(
            "marks {} outside 0..={}",
            record.marks, record.max_marks
        )));
    }

    let percentage = 100.0 * record.marks / record.max_marks;
    Ok(AnalyzedRecord {
        record: record.clone(),
        percentage,
        grade: grade_for(percentage),
        status: status_for(percentage),
        recommendation: recommendation_for(percentage).to_string(),
    })
}

pub fn analyze_records(records: &[MarkRecord]) -> Result<Vec<AnalyzedRecord>> {
    let analyzed = records
        .iter()
        .map(analyze_record)
        .collect::<Result<Vec<_>>>()?;
    debug!("Computed metrics for {} records", analyzed.len());
    Ok(analyzed)
}

pub fn grade_for(percentage: f64) -> Grade {
    if percentage >= 80.0 {
        Grade::A
    } else if percentage >= 60.0 {
        Grade::B
    } else if percentage >= 40.0 {
        Grade::C
    } else {
        Grade::F
    }
}

pub fn status_for(percentage: f64) -> Status {
    if percentage >= PASS_MARK {
        Status::Pass
    } else {
        Status::Fail
    }
}

pub fn recommendation_for(percentage: f64) -> &'static str {
    if percentage >= 80.0 {
        EXCELLENT_MESSAGE
    } else if percentage >= 60.0 {
        GOOD_MESSAGE
    } else if percentage >= 40.0 {
        IMPROVE_MESSAGE
    } else {
        CRITICAL_MESSAGE
    }
}

/// Per-student totals, in the order students first appear.
pub fn summarize_students(records: &[AnalyzedRecord]) -> Vec<StudentSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(StudentSummary, f64)> = Vec::new();

    for analyzed in records {
        let record = &analyzed.record;
        let slot = *index.entry(record.student_id.as_str()).or_insert_with(|| {
            totals.push((
                StudentSummary {
                    student_id: record.student_id.clone(),
                    student_name: record.student_name.clone(),
                    subject_count: 0,
                    average_percentage: 0.0,
                    passed: 0,
                    failed: 0,
                },
                0.0,
            ));
            totals.len() - 1
        });

        let (summary, percentage_sum) = &mut totals[slot];
        summary.subject_count += 1;
        *percentage_sum += analyzed.percentage;
        match analyzed.status {
            Status::Pass => summary.passed += 1,
            Status::Fail => summary.failed += 1,
        }
    }

    totals
        .into_iter()
        .map(|(mut summary, percentage_sum)| {
            summary.average_percentage = if summary.subject_count == 0 {
                0.0
            } else {
                percentage_sum / summary.subject_count as f64
            };
            summary
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(marks: f64, max_marks: f64) -> MarkRecord {
        MarkRecord {
            student_id: "s1".to_string(),
            student_name: "Avery Lee".to_string(),
            subject: "Math".to_string(),
            marks,
            max_marks,
        }
    }

    #[test]
    fn grades_follow_band_boundaries() {
        assert_eq!(grade_for(0.0), Grade::F);
        assert_eq!(grade_for(39.99), Grade::F);
        assert_eq!(grade_for(40.0), Grade::C);
        assert_eq!(grade_for(59.99), Grade::C);
        assert_eq!(grade_for(60.0), Grade::B);
        assert_eq!(grade_for(79.0), Grade::B);
        assert_eq!(grade_for(80.0), Grade::A);
        assert_eq!(grade_for(100.0), Grade::A);
    }

    #[test]
    fn pass_mark_is_inclusive() {
        let at_mark = analyze_record(&sample_record(40.0, 100.0)).unwrap();
        assert_eq!(at_mark.grade, Grade::C);
        assert_eq!(at_mark.status, Status::Pass);

        let below = analyze_record(&sample_record(39.0, 100.0)).unwrap();
        assert_eq!(below.grade, Grade::F);
        assert_eq!(below.status, Status::Fail);
    }

    #[test]
    fn a_and_b_boundary() {
        assert_eq!(analyze_record(&sample_record(80.0, 100.0)).unwrap().grade, Grade::A);
        assert_eq!(analyze_record(&sample_record(79.0, 100.0)).unwrap().grade, Grade::B);
    }

    #[test]
    fn percentage_keeps_full_precision() {
        let analyzed = analyze_record(&sample_record(1.0, 3.0)).unwrap();
        assert!((analyzed.percentage - 100.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn recommendations_follow_tiers() {
        assert_eq!(recommendation_for(95.0), EXCELLENT_MESSAGE);
        assert_eq!(recommendation_for(80.0), EXCELLENT_MESSAGE);
        assert_eq!(recommendation_for(60.0), GOOD_MESSAGE);
        assert_eq!(recommendation_for(40.0), IMPROVE_MESSAGE);
        assert_eq!(recommendation_for(12.5), CRITICAL_MESSAGE);
    }

    #[test]
    fn zero_denominator_is_an_invalid_record() {
        let err = analyze_record(&sample_record(50.0, 0.0)).unwrap_err();
        assert!(matches!(err, ReportError::InvalidRecord { .. }));
    }

    #[test]
    fn out_of_range_marks_are_invalid_records() {
        assert!(analyze_record(&sample_record(120.0, 100.0)).is_err());
        assert!(analyze_record(&sample_record(-5.0, 100.0)).is_err());
    }

    #[test]
    fn summaries_accumulate_by_student() {
        let mut other = sample_record(20.0, 100.0);
        other.student_id = "s2".to_string();
        other.student_name = "Jules Moreno".to_string();

        let records = analyze_records(&[
            sample_record(90.0, 100.0),
            other,
            sample_record(30.0, 100.0),
        ])
        .unwrap();

        let summaries = summarize_students(&records);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].student_id, "s1");
        assert_eq!(summaries[0].subject_count, 2);
        assert_eq!(summaries[0].passed, 1);
        assert_eq!(summaries[0].failed, 1);
        assert!((summaries[0].average_percentage - 60.0).abs() < 0.001);
        assert_eq!(summaries[1].student_name, "Jules Moreno");
        assert_eq!(summaries[1].failed, 1);
    }
}
