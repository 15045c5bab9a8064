use std::fmt::Write as _;
use std::io::Write;

use log::debug;
use serde::Serialize;

use crate::config::PageLayout;
use crate::error::{ReportError, Result};
use crate::models::AnalyzedRecord;

pub const REPORT_TITLE: &str = "Student Performance Report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    Title,
    Metric,
    Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub kind: LineKind,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub number: usize,
    pub lines: Vec<Line>,
}

/// Logical layout of one student's report, ready for a page-description writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub student_id: String,
    pub student_name: String,
    pages: Vec<Page>,
}

impl ReportDocument {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.pages.iter().flat_map(|page| page.lines.iter())
    }

    pub fn count_lines(&self, kind: LineKind) -> usize {
        self.lines().filter(|line| line.kind == kind).count()
    }

    /// Plain-text dump of every page with line coordinates.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        for page in &self.pages {
            let _ = writeln!(output, "=== Page {} of {} ===", page.number, self.pages.len());
            for line in &page.lines {
                let _ = writeln!(
                    output,
                    "[{:>6.1}, {:>6.1}] {}",
                    line.x, line.y, line.text
                );
            }
        }

        output
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_text<W: Write>(&self, mut sink: W) -> Result<()> {
        sink.write_all(self.to_text().as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}

pub fn metric_line(analyzed: &AnalyzedRecord) -> String {
    format!(
        "{}: {}/{} ({:.2}%) [{}]",
        analyzed.record.subject,
        format_number(analyzed.record.marks),
        format_number(analyzed.record.max_marks),
        analyzed.percentage,
        analyzed.grade
    )
}

/// Formats a mark without trailing zeros, e.g. `45` or `37.5`.
pub fn format_number(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Greedy word wrap measured in characters.
///
/// A word longer than `width` gets a line of its own. Always returns at
/// least one line, which is empty for blank input.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

struct PageBuilder<'a> {
    layout: &'a PageLayout,
    title: String,
    pages: Vec<Page>,
    current: Vec<Line>,
    cursor: f32,
    has_body: bool,
}

impl<'a> PageBuilder<'a> {
    fn new(layout: &'a PageLayout, title: String) -> Self {
        let mut builder = PageBuilder {
            layout,
            title,
            pages: Vec::new(),
            current: Vec::new(),
            cursor: layout.body_top,
            has_body: false,
        };
        builder.start_page();
        builder
    }

    fn start_page(&mut self) {
        let text = if self.pages.is_empty() {
            self.title.clone()
        } else {
            format!("{} (continued)", self.title)
        };
        self.current.push(Line {
            kind: LineKind::Title,
            x: self.layout.title_x,
            y: self.layout.title_y,
            font_size: self.layout.title_font_size,
            text,
        });
        self.cursor = self.layout.body_top;
        self.has_body = false;
    }

    fn close_page(&mut self) {
        let number = self.pages.len() + 1;
        let lines = std::mem::take(&mut self.current);
        self.pages.push(Page { number, lines });
    }

    fn push(&mut self, kind: LineKind, text: String) {
        // A page always takes at least one body line, so tiny layouts still progress.
        if self.cursor < self.layout.bottom_margin && self.has_body {
            self.close_page();
            self.start_page();
        }

        self.current.push(Line {
            kind,
            x: self.layout.body_x,
            y: self.cursor,
            font_size: self.layout.body_font_size,
            text,
        });
        self.cursor -= self.layout.line_height;
        self.has_body = true;
    }

    fn finish(mut self) -> Vec<Page> {
        self.close_page();
        self.pages
    }
}

/// Lays out one student's records. Fails on empty input, on records of more
/// than one student, and on a layout that fails [`PageLayout::validate`].
pub fn render_report_with(
    records: &[AnalyzedRecord],
    layout: &PageLayout,
) -> Result<ReportDocument> {
    let first = records.first().ok_or(ReportError::EmptyReport)?;
    layout.validate()?;

    let student_id = first.record.student_id.clone();
    if let Some(other) = records
        .iter()
        .find(|analyzed| analyzed.record.student_id != student_id)
    {
        return Err(ReportError::MixedStudents {
            expected: student_id,
            found: other.record.student_id.clone(),
        });
    }
    let student_name = first.record.student_name.clone();

    let mut builder = PageBuilder::new(layout, format!("{REPORT_TITLE}: {student_name}"));
    for analyzed in records {
        builder.push(LineKind::Metric, metric_line(analyzed));
        for line in wrap_text(&analyzed.recommendation, layout.wrap_width) {
            builder.push(LineKind::Recommendation, line);
        }
    }
    let pages = builder.finish();

    debug!(
        "Rendered {} records for {} across {} pages",
        records.len(),
        student_id,
        pages.len()
    );

    Ok(ReportDocument {
        student_id,
        student_name,
        pages,
    })
}
