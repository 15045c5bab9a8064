use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use student_report_pipeline::normalize::normalize_rows;
use student_report_pipeline::source;
use student_report_pipeline::{MarkRecord, RawMarkRow, RawNumber};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_student(pool: &PgPool, student_id: &str, name: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO student_report.students (student_id, name)
        VALUES ($1, $2)
        ON CONFLICT (student_id) DO UPDATE
        SET name = EXCLUDED.name
        "#,
    )
    .bind(student_id)
    .bind(name)
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_subject(pool: &PgPool, name: &str) -> anyhow::Result<i32> {
    let id: i32 = sqlx::query(
        r#"
        INSERT INTO student_report.subjects (name)
        VALUES ($1)
        ON CONFLICT (name) DO UPDATE
        SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await?
    .get("id");
    Ok(id)
}

async fn insert_mark(
    pool: &PgPool,
    record: &MarkRecord,
    recorded_at: DateTime<Utc>,
    source_key: Option<&str>,
) -> anyhow::Result<bool> {
    upsert_student(pool, &record.student_id, &record.student_name).await?;
    let subject_id = upsert_subject(pool, &record.subject).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO student_report.marks
        (id, student_id, subject_id, marks, max_marks, recorded_at, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&record.student_id)
    .bind(subject_id)
    .bind(record.marks)
    .bind(record.max_marks)
    .bind(recorded_at)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let marks = vec![
        ("seed-001", "S001", "Avery Lee", "Mathematics", 52.0, 100.0, (2026, 1, 12)),
        ("seed-002", "S001", "Avery Lee", "Mathematics", 61.0, 100.0, (2026, 2, 9)),
        ("seed-003", "S001", "Avery Lee", "Mathematics", 74.0, 100.0, (2026, 3, 9)),
        ("seed-004", "S001", "Avery Lee", "Physics", 38.0, 50.0, (2026, 2, 2)),
        ("seed-005", "S002", "Jules Moreno", "Mathematics", 88.0, 100.0, (2026, 1, 12)),
        ("seed-006", "S002", "Jules Moreno", "Mathematics", 71.0, 100.0, (2026, 2, 9)),
        ("seed-007", "S002", "Jules Moreno", "Chemistry", 17.0, 50.0, (2026, 2, 16)),
        ("seed-008", "S003", "Kiara Patel", "Physics", 40.0, 100.0, (2026, 1, 28)),
        ("seed-009", "S003", "Kiara Patel", "Chemistry", 79.0, 100.0, (2026, 1, 30)),
    ];

    for (source_key, student_id, name, subject, score, max_marks, (y, m, d)) in marks {
        let record = MarkRecord::new(student_id, name, subject, score, max_marks)?;
        let recorded_at = NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .context("invalid date")?
            .and_utc();
        insert_mark(pool, &record, recorded_at, Some(source_key)).await?;
    }

    Ok(())
}

/// Loads the raw mark table in recording order, optionally for one student.
pub async fn fetch_mark_rows(
    pool: &PgPool,
    student_id: Option<&str>,
) -> anyhow::Result<Vec<RawMarkRow>> {
    let mut query = String::from(
        "SELECT st.student_id, st.name, su.name AS subject, m.marks, m.max_marks \
         FROM student_report.marks m \
         JOIN student_report.students st ON st.student_id = m.student_id \
         JOIN student_report.subjects su ON su.id = m.subject_id",
    );

    if student_id.is_some() {
        query.push_str(" WHERE m.student_id = $1");
    }
    query.push_str(" ORDER BY m.recorded_at, m.seq");

    let mut rows = sqlx::query(&query);
    if let Some(value) = student_id {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut marks = Vec::with_capacity(records.len());

    for row in records {
        marks.push(RawMarkRow {
            student_id: row.get("student_id"),
            student_name: row.get("name"),
            subject: row.get("subject"),
            marks: RawNumber::Float(row.get("marks")),
            max_marks: RawNumber::Float(row.get("max_marks")),
        });
    }

    Ok(marks)
}

/// Validates the whole file first so a bad row leaves the database untouched.
pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let rows = source::read_csv(csv_path)
        .with_context(|| format!("failed to read {}", csv_path.display()))?;
    let records = normalize_rows(&rows)?;
    let recorded_at = Utc::now();
    let mut inserted = 0usize;

    for record in &records {
        if insert_mark(pool, record, recorded_at, None).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}
