use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::{PgPool, PgPoolOptions};

use student_report_pipeline::logging::init_logger;
use student_report_pipeline::metrics::summarize_students;
use student_report_pipeline::pipeline::{records_for_student, roster};
use student_report_pipeline::report::format_number;
use student_report_pipeline::{
    source, trend, InMemoryRepository, PageLayout, PerformanceSubmission, Pipeline,
    PipelineConfig, RawMarkRow, ScoreSeries, TrendConfig,
};

mod db;

#[derive(Parser)]
#[command(name = "student-report")]
#[command(about = "Student performance analytics and printable reports", long_about = None)]
struct Cli {
    /// Show debug logs
    #[arg(long, global = true)]
    verbose: bool,
    /// Silence all logs
    #[arg(long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample students, subjects and marks
    Seed,
    /// Import mark rows from a CSV file into the database
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print percentage, grade, status and recommendation per record
    Analyze {
        /// Read rows from this CSV file instead of the database
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        student: Option<String>,
        /// Also write the analyzed table to this CSV file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List students with their totals
    Students {
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Render one student's paginated report
    Report {
        #[arg(long)]
        student: String,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long)]
        wrap_width: Option<usize>,
        #[arg(long)]
        line_height: Option<f32>,
        #[arg(long)]
        bottom_margin: Option<f32>,
    },
    /// Classify a single score series
    Trend {
        #[arg(long, value_delimiter = ',', required = true)]
        scores: Vec<f64>,
        #[arg(long)]
        epsilon: Option<f64>,
    },
    /// Classify every (student, subject) score series
    Trends {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        epsilon: Option<f64>,
    },
    /// Load performance submissions from JSON and print their trend reports
    Performance {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        student: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set when --csv is not given")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load_rows(csv: Option<&Path>, student: Option<&str>) -> anyhow::Result<Vec<RawMarkRow>> {
    match csv {
        Some(path) => source::read_csv(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let pool = connect().await?;
            db::fetch_mark_rows(&pool, student).await
        }
    }
}

async fn load_pipeline(
    csv: Option<&Path>,
    student: Option<&str>,
    config: PipelineConfig,
) -> anyhow::Result<Pipeline<InMemoryRepository>> {
    let rows = load_rows(csv, student).await?;
    let mut pipeline = Pipeline::new(InMemoryRepository::new(), config);
    pipeline.ingest(rows)?;
    Ok(pipeline)
}

fn trend_config(epsilon: Option<f64>) -> TrendConfig {
    match epsilon {
        Some(epsilon) => TrendConfig { epsilon },
        None => TrendConfig::default(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let pool = connect().await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} marks from {}.", csv.display());
        }
        Commands::Analyze { csv, student, out } => {
            let pipeline =
                load_pipeline(csv.as_deref(), student.as_deref(), PipelineConfig::default())
                    .await?;
            let mut records = pipeline.analyze()?;
            if let Some(id) = student.as_deref() {
                records = records_for_student(&records, id);
            }

            if records.is_empty() {
                println!("No data available.");
                return Ok(());
            }

            for analyzed in &records {
                println!(
                    "- {} ({}) {}: {}/{} = {:.2}% [{}] {} - {}",
                    analyzed.record.student_name,
                    analyzed.record.student_id,
                    analyzed.record.subject,
                    format_number(analyzed.record.marks),
                    format_number(analyzed.record.max_marks),
                    analyzed.percentage,
                    analyzed.grade,
                    analyzed.status,
                    analyzed.recommendation
                );
            }

            if let Some(out) = out {
                let file = std::fs::File::create(&out)
                    .with_context(|| format!("failed to create {}", out.display()))?;
                source::write_analyzed(&records, file)?;
                println!("Table written to {}.", out.display());
            }
        }
        Commands::Students { csv } => {
            let pipeline = load_pipeline(csv.as_deref(), None, PipelineConfig::default()).await?;
            let records = pipeline.analyze()?;
            let students = roster(&records);

            if students.is_empty() {
                println!("No data available.");
                return Ok(());
            }

            println!("Total students: {}", students.len());
            for summary in summarize_students(&records) {
                println!(
                    "- {} ({}) {} subjects, average {:.2}%, {} passed, {} failed",
                    summary.student_name,
                    summary.student_id,
                    summary.subject_count,
                    summary.average_percentage,
                    summary.passed,
                    summary.failed
                );
            }
        }
        Commands::Report {
            student,
            csv,
            out,
            format,
            wrap_width,
            line_height,
            bottom_margin,
        } => {
            let defaults = PageLayout::default();
            let layout = PageLayout {
                wrap_width: wrap_width.unwrap_or(defaults.wrap_width),
                line_height: line_height.unwrap_or(defaults.line_height),
                bottom_margin: bottom_margin.unwrap_or(defaults.bottom_margin),
                ..defaults
            };
            let config = PipelineConfig {
                layout,
                ..PipelineConfig::default()
            };

            let pipeline = load_pipeline(csv.as_deref(), Some(student.as_str()), config).await?;
            let document = pipeline.report_for_student(&student)?;

            let (body, extension) = match format {
                OutputFormat::Text => (document.to_text(), "txt"),
                OutputFormat::Json => (document.to_json()?, "json"),
            };
            let out = out.unwrap_or_else(|| {
                PathBuf::from(format!("{}_report.{extension}", document.student_name))
            });
            std::fs::write(&out, body)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "Report generated: {} ({} pages).",
                out.display(),
                document.page_count()
            );
        }
        Commands::Trend { scores, epsilon } => {
            let series = ScoreSeries::new(scores)?;
            let (slope, verdict) = trend::analyze_trend(&series, &trend_config(epsilon));
            match slope {
                Some(slope) => println!("{verdict} (slope {slope:.4}): {}", verdict.message()),
                None => println!("{verdict}: {}", verdict.message()),
            }
        }
        Commands::Trends {
            csv,
            student,
            epsilon,
        } => {
            let config = PipelineConfig {
                trend: trend_config(epsilon),
                ..PipelineConfig::default()
            };
            let pipeline = load_pipeline(csv.as_deref(), student.as_deref(), config).await?;
            let trends = pipeline.subject_trends(student.as_deref())?;

            if trends.is_empty() {
                println!("No data available.");
                return Ok(());
            }

            for subject_trend in trends {
                println!(
                    "- {} ({}) {}: {} over {} scores",
                    subject_trend.student_name,
                    subject_trend.student_id,
                    subject_trend.subject,
                    subject_trend.verdict,
                    subject_trend.series.len()
                );
            }
        }
        Commands::Performance { input, student } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let submissions: Vec<PerformanceSubmission> =
                serde_json::from_str(&raw).context("invalid submissions JSON")?;

            let mut pipeline = Pipeline::new(InMemoryRepository::new(), PipelineConfig::default());
            let mut student_ids = Vec::new();
            for submission in submissions {
                if !student_ids.contains(&submission.student_id) {
                    student_ids.push(submission.student_id.clone());
                }
                pipeline.submit_performance(submission)?;
            }

            let selected = match student {
                Some(id) => vec![id],
                None => student_ids,
            };
            for id in selected {
                let report = pipeline.performance_report(&id)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }

    Ok(())
}
