//! Property-based tests for the metrics and layout invariants.

use proptest::prelude::*;

use student_report_pipeline::metrics::{analyze_record, grade_for, status_for};
use student_report_pipeline::report::{render_report_with, wrap_text};
use student_report_pipeline::{Grade, LineKind, MarkRecord, PageLayout, Status};

fn record(marks: f64, max_marks: f64) -> MarkRecord {
    MarkRecord::new("S001", "Avery Lee", "Mathematics", marks, max_marks).unwrap()
}

proptest! {
    #[test]
    fn percentage_stays_within_bounds(max_marks in 0.01f64..10_000.0, ratio in 0.0f64..=1.0) {
        let marks = (max_marks * ratio).min(max_marks);
        let analyzed = analyze_record(&record(marks, max_marks)).unwrap();
        prop_assert!((0.0..=100.0).contains(&analyzed.percentage));
    }

    #[test]
    fn status_agrees_with_grade(percentage in 0.0f64..=100.0) {
        let failed = grade_for(percentage) == Grade::F;
        prop_assert_eq!(status_for(percentage) == Status::Fail, failed);
    }

    #[test]
    fn wrapping_preserves_words(
        words in prop::collection::vec("[a-z]{1,15}", 0..40),
        width in 1usize..60,
    ) {
        let text = words.join(" ");
        let lines = wrap_text(&text, width);
        prop_assert!(!lines.is_empty());

        let rejoined: Vec<String> = lines
            .iter()
            .flat_map(|line| line.split_whitespace().map(str::to_string))
            .collect();
        prop_assert_eq!(rejoined, words);

        for line in &lines {
            prop_assert!(line.chars().count() <= width || !line.contains(' '));
        }
    }

    #[test]
    fn every_record_gets_a_metric_line(
        count in 1usize..60,
        body_top in 60.0f32..800.0,
        line_height in 5.0f32..40.0,
    ) {
        let records: Vec<_> = (0..count)
            .map(|i| analyze_record(&record((i % 11) as f64, 10.0)).unwrap())
            .collect();
        let layout = PageLayout {
            body_top,
            line_height,
            bottom_margin: 50.0,
            ..PageLayout::default()
        };

        let document = render_report_with(&records, &layout).unwrap();
        prop_assert_eq!(document.count_lines(LineKind::Metric), count);
        prop_assert!(document.count_lines(LineKind::Recommendation) >= count);
    }
}
