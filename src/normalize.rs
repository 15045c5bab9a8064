use log::{debug, warn};

use crate::error::{ReportError, Result};
use crate::models::{MarkRecord, RawMarkRow, RawNumber};

/// Validates raw rows and shapes them into mark records.
///
/// Fails on the first malformed row. Empty input yields an empty list.
pub fn normalize_rows(rows: &[RawMarkRow]) -> Result<Vec<MarkRecord>> {
    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| normalize_row(index, row))
        .collect::<Result<Vec<_>>>()?;

    debug!("Normalized {} mark rows", records.len());
    Ok(records)
}

pub fn normalize_row(index: usize, row: &RawMarkRow) -> Result<MarkRecord> {
    let result = build_record(index, row);
    if let Err(err) = &result {
        warn!("Rejected mark row: {err}");
    }
    result
}

fn build_record(index: usize, row: &RawMarkRow) -> Result<MarkRecord> {
    let student_id = required_text(index, "student_id", &row.student_id)?;
    let student_name = required_text(index, "student_name", &row.student_name)?;
    let subject = required_text(index, "subject", &row.subject)?;
    let marks = coerce_number(index, "marks", &row.marks)?;
    let max_marks = coerce_number(index, "max_marks", &row.max_marks)?;
    check_bounds(index, marks, max_marks)?;

    Ok(MarkRecord {
        student_id,
        student_name,
        subject,
        marks,
        max_marks,
    })
}

impl MarkRecord {
    pub fn new(
        student_id: &str,
        student_name: &str,
        subject: &str,
        marks: f64,
        max_marks: f64,
    ) -> Result<Self> {
        normalize_row(
            0,
            &RawMarkRow::new(student_id, student_name, subject, marks, max_marks),
        )
    }
}

fn required_text(index: usize, field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReportError::validation(index, format!("{field} is empty")));
    }
    Ok(trimmed.to_string())
}

fn coerce_number(index: usize, field: &str, value: &RawNumber) -> Result<f64> {
    let number = match value {
        RawNumber::Int(n) => *n as f64,
        RawNumber::Float(n) => *n,
        RawNumber::Text(text) => text.trim().parse::<f64>().map_err(|_| {
            ReportError::validation(index, format!("{field} is not a number: {text:?}"))
        })?,
    };

    if !number.is_finite() {
        return Err(ReportError::validation(
            index,
            format!("{field} is not finite"),
        ));
    }
    Ok(number)
}

fn check_bounds(index: usize, marks: f64, max_marks: f64) -> Result<()> {
    if max_marks <= 0.0 {
        return Err(ReportError::validation(
            index,
            format!("max_marks must be positive, got {max_marks}"),
        ));
    }
    if marks < 0.0 {
        return Err(ReportError::validation(
            index,
            format!("marks must not be negative, got {marks}"),
        ));
    }
    if marks > max_marks {
        return Err(ReportError::validation(
            index,
            format!("marks {marks} exceed max_marks {max_marks}"),
        ));
    }
    Ok(())
}
