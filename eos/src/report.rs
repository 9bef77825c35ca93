//! `eos analyze`: run the analytics engine and render the report as text,
//! JSON or a self-contained HTML page.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use eos_core::analytics::{create_engine, AggregationResult, AnalysisReport, AnalyticsEngine};
use eos_core::format::format_number;
use eos_core::{Config, Database};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Numeric field for statistics (default from config, usually missed_hours)
    #[arg(long)]
    field: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// List enabled modules without running analysis
    #[arg(long)]
    list_modules: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

pub fn run(config: &Config, db: &Database, args: &AnalyzeArgs) -> Result<()> {
    let engine = create_engine(&config.analytics, &config.chart)
        .context("failed to create analytics engine")?;

    if args.list_modules {
        print_modules(&engine);
        return Ok(());
    }

    let field = args
        .field
        .as_deref()
        .unwrap_or(&config.analytics.statistics_field);

    let snapshot = db.load_snapshot().context("failed to load student snapshot")?;
    let report = engine
        .run_analysis(&snapshot, field)
        .context("analysis failed")?;

    let rendered = match args.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Html => render_html(&report),
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

fn print_modules(engine: &AnalyticsEngine) {
    if engine.modules().is_empty() {
        println!("No analytics modules enabled.");
        return;
    }
    println!("Available modules:");
    for module in engine.modules() {
        println!("  - {} ({})", module.name(), module.key());
    }
}

/// One `label: value` line per category.
fn result_lines(result: &AggregationResult) -> Vec<(String, String)> {
    match result {
        AggregationResult::SubjectAverages(map) => map
            .iter()
            .map(|(subject, avg)| (subject.clone(), format_number(*avg)))
            .collect(),
        AggregationResult::MajorCounts(map) => map
            .iter()
            .map(|(major, count)| (major.clone(), count.to_string()))
            .collect(),
        AggregationResult::YearAttendance(map) => map
            .iter()
            .map(|(year, a)| {
                (
                    format!("Year {year}"),
                    format!(
                        "total {}, average {}",
                        a.total_missed_hours,
                        format_number(a.average_missed_hours)
                    ),
                )
            })
            .collect(),
    }
}

fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Analyzed {} student(s)\n", report.student_count);

    let _ = writeln!(out, "Statistics ({})", report.statistics_field);
    for (metric, value) in report.statistics.entries() {
        let _ = writeln!(out, "  {:<8} {}", metric, format_number(value));
    }

    for module in report.modules.iter() {
        let _ = writeln!(out, "\n{}", module.name);
        let lines = result_lines(&module.result);
        if lines.is_empty() {
            let _ = writeln!(out, "  (no data)");
        }
        for (label, value) in lines {
            let _ = writeln!(out, "  {label:<24} {value}");
        }
    }
    out
}

fn render_html(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>eos analytics report</title>\n");
    out.push_str(
        "<style>body{font-family:sans-serif;margin:2em;color:#222}\
         table{border-collapse:collapse;margin:0.5em 0}\
         td,th{border:1px solid #ccc;padding:4px 10px;text-align:left}\
         section{margin-bottom:2.5em}</style>\n",
    );
    out.push_str("</head>\n<body>\n<h1>Analytics report</h1>\n");
    let _ = writeln!(
        out,
        "<p>{} student(s), generated {}</p>",
        report.student_count,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    let _ = writeln!(
        out,
        "<section>\n<h2>Statistics: {}</h2>\n<table>",
        escape_html(&report.statistics_field)
    );
    for (metric, value) in report.statistics.entries() {
        let _ = writeln!(
            out,
            "<tr><th>{metric}</th><td>{}</td></tr>",
            format_number(value)
        );
    }
    out.push_str("</table>\n</section>\n");

    for module in report.modules.iter() {
        let _ = writeln!(out, "<section>\n<h2>{}</h2>", escape_html(module.name));
        let _ = writeln!(
            out,
            "<img src=\"{}\" alt=\"{}\">",
            module.chart.data_uri(),
            escape_html(module.name)
        );
        out.push_str("<table>\n");
        for (label, value) in result_lines(&module.result) {
            let _ = writeln!(
                out,
                "<tr><th>{}</th><td>{}</td></tr>",
                escape_html(&label),
                escape_html(&value)
            );
        }
        out.push_str("</table>\n</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
