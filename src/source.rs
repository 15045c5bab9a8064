use std::io::{Read, Write};
use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::models::{AnalyzedRecord, RawMarkRow};

/// Reads raw mark rows from CSV with a
/// `student_id,student_name,subject,marks,max_marks` header.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawMarkRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.deserialize::<RawMarkRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn read_csv(path: &Path) -> Result<Vec<RawMarkRow>> {
    let file = std::fs::File::open(path)?;
    let rows = read_rows(file)?;
    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[derive(Serialize)]
struct AnalyzedRow<'a> {
    student_id: &'a str,
    student_name: &'a str,
    subject: &'a str,
    marks: f64,
    max_marks: f64,
    percentage: String,
    grade: String,
    status: String,
    recommendation: &'a str,
}

/// Writes analyzed records as a flat CSV table, percentages to two places.
pub fn write_analyzed<W: Write>(records: &[AnalyzedRecord], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for analyzed in records {
        writer.serialize(AnalyzedRow {
            student_id: &analyzed.record.student_id,
            student_name: &analyzed.record.student_name,
            subject: &analyzed.record.subject,
            marks: analyzed.record.marks,
            max_marks: analyzed.record.max_marks,
            percentage: format!("{:.2}", analyzed.percentage),
            grade: analyzed.grade.to_string(),
            status: analyzed.status.to_string(),
            recommendation: &analyzed.recommendation,
        })?;
    }
    writer.flush()?;
    Ok(())
}
