use std::io::Write;

use student_report_pipeline::pipeline::{records_for_student, roster, subject_trends};
use student_report_pipeline::source::read_csv;
use student_report_pipeline::{
    render_report, run_analytics, Grade, InMemoryRepository, LineKind, PageLayout, Pipeline,
    PipelineConfig, RawMarkRow, ReportError, Status, TrendConfig, TrendVerdict,
};

const MARKS_CSV: &str = "\
student_id,student_name,subject,marks,max_marks
S001,Avery Lee,Mathematics,52,100
S002,Jules Moreno,Mathematics,88,100
S001,Avery Lee,Physics,38,50
S001,Avery Lee,Mathematics,61,100
S003,Kiara Patel,Chemistry,39,100
S001,Avery Lee,Mathematics,74,100
";

fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file
}

#[test]
fn csv_rows_flow_through_to_a_report() {
    let fixture = write_fixture(MARKS_CSV);
    let rows = read_csv(fixture.path()).unwrap();
    let records = run_analytics(&rows).unwrap();
    assert_eq!(records.len(), 6);

    let kiara = records_for_student(&records, "S003");
    assert_eq!(kiara[0].grade, Grade::F);
    assert_eq!(kiara[0].status, Status::Fail);

    let avery = records_for_student(&records, "S001");
    let document = render_report(&avery).unwrap();
    assert_eq!(document.student_name, "Avery Lee");
    assert_eq!(document.page_count(), 1);
    assert_eq!(document.count_lines(LineKind::Metric), 4);

    let text = document.to_text();
    assert!(text.contains("Physics: 38/50 (76.00%) [B]"));
}

#[test]
fn roster_lists_each_student_once() {
    let fixture = write_fixture(MARKS_CSV);
    let records = run_analytics(&read_csv(fixture.path()).unwrap()).unwrap();
    let names: Vec<String> = roster(&records)
        .into_iter()
        .map(|student| student.student_name)
        .collect();
    assert_eq!(names, vec!["Avery Lee", "Jules Moreno", "Kiara Patel"]);
}

#[test]
fn chronological_marks_give_subject_trends() {
    let fixture = write_fixture(MARKS_CSV);
    let records = run_analytics(&read_csv(fixture.path()).unwrap()).unwrap();
    let trends = subject_trends(&records, &TrendConfig::default()).unwrap();

    let math = trends
        .iter()
        .find(|t| t.student_id == "S001" && t.subject == "Mathematics")
        .unwrap();
    assert_eq!(math.verdict, TrendVerdict::Improving);

    let physics = trends
        .iter()
        .find(|t| t.student_id == "S001" && t.subject == "Physics")
        .unwrap();
    assert_eq!(physics.verdict, TrendVerdict::InsufficientData);
}

#[test]
fn malformed_csv_row_is_a_validation_error() {
    let fixture = write_fixture(
        "student_id,student_name,subject,marks,max_marks\nS001,Avery Lee,Mathematics,50,0\n",
    );
    let rows = read_csv(fixture.path()).unwrap();
    assert!(matches!(
        run_analytics(&rows),
        Err(ReportError::Validation { row: 0, .. })
    ));
}

#[test]
fn missing_csv_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, ReportError::Io(_)));
}

#[test]
fn many_records_paginate_without_loss() {
    let rows: Vec<RawMarkRow> = (0..120)
        .map(|i| {
            let subject = format!("Unit {i}");
            RawMarkRow::new("S001", "Avery Lee", &subject, (i % 101) as i64, 100_i64)
        })
        .collect();

    let config = PipelineConfig {
        layout: PageLayout {
            wrap_width: 12,
            ..PageLayout::default()
        },
        ..PipelineConfig::default()
    };
    let mut pipeline = Pipeline::new(InMemoryRepository::new(), config);
    assert_eq!(pipeline.ingest(rows).unwrap(), 120);

    let document = pipeline.report_for_student("S001").unwrap();
    assert!(document.page_count() > 5);
    assert_eq!(document.count_lines(LineKind::Metric), 120);
    for page in document.pages() {
        for line in page.lines.iter().filter(|line| line.kind == LineKind::Recommendation) {
            assert!(line.text.chars().count() <= 12 || !line.text.contains(' '));
        }
    }

    let again = pipeline.report_for_student("S001").unwrap();
    assert_eq!(document.to_text(), again.to_text());
}

#[test]
fn json_document_round_trips_through_serde_value() {
    let rows = [RawMarkRow::new("S002", "Jules Moreno", "Art", 17_i64, 50_i64)];
    let records = run_analytics(&rows).unwrap();
    let document = render_report(&records).unwrap();
    let value: serde_json::Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();

    assert_eq!(value["student_id"], "S002");
    assert_eq!(value["pages"][0]["lines"][1]["kind"], "Metric");
    assert_eq!(value["pages"][0]["lines"][2]["text"], "Critical! Requires immediate attention.");
}
