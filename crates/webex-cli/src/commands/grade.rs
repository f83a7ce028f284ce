//! The `webex grade` command.

use std::path::PathBuf;

use anyhow::Result;

use webex_core::aggregate::{format_points, SectionSummary};
use webex_core::config::load_config_from;
use webex_core::engine::{GradeReporter, GradingEngine};
use webex_core::error::QuizError;
use webex_core::model::ItemResult;
use webex_core::parser;
use webex_core::report::GradeReport;
use webex_report::html::write_html_report;

/// Console progress reporter.
struct ConsoleReporter;

impl GradeReporter for ConsoleReporter {
    fn on_item_graded(&self, section_id: &str, position: usize, result: &ItemResult) {
        tracing::debug!(
            "{section_id} #{}: {} {:?} ({} / {})",
            position + 1,
            result.kind,
            result.verdict,
            format_points(result.earned),
            format_points(result.possible)
        );
    }

    fn on_response_error(&self, section_id: &str, error: &QuizError) {
        eprintln!("  WARNING: {section_id}: {error}");
    }

    fn on_section_complete(&self, section_id: &str, summary: &SectionSummary) {
        tracing::debug!("{section_id}: {}", summary.text);
    }
}

pub fn execute(
    quiz_path: PathBuf,
    responses_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    hidden: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "markdown"]
    } else {
        format.split(',').map(|s| s.trim()).collect()
    };
    for fmt in &formats {
        anyhow::ensure!(
            matches!(*fmt, "text" | "json" | "html" | "markdown"),
            "unknown format: '{fmt}' (expected text, json, html, markdown or all)"
        );
    }

    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let mut quizzes = parser::load_quizzes(&quiz_path)?;
    anyhow::ensure!(
        !quizzes.is_empty(),
        "no quizzes found in {}",
        quiz_path.display()
    );

    if let Some(path) = &responses_path {
        let responses = parser::parse_responses(path)?;
        let mut unmatched: Option<Vec<String>> = None;
        for quiz in &mut quizzes {
            let missing = quiz.apply_responses(&responses);
            unmatched = Some(match unmatched {
                None => missing,
                Some(prev) => prev.into_iter().filter(|id| missing.contains(id)).collect(),
            });
        }
        for id in unmatched.unwrap_or_default() {
            eprintln!("Warning: response for unknown item '{id}'");
        }
    }

    if hidden {
        for quiz in &mut quizzes {
            for section in &mut quiz.sections {
                section.config.revealed = false;
            }
        }
    }

    let engine = GradingEngine::new(config.rules);
    let reporter = ConsoleReporter;

    for quiz in &quizzes {
        eprintln!(
            "webex v{}: grading {} ({} sections, {} items)",
            env!("CARGO_PKG_VERSION"),
            quiz.id,
            quiz.sections.len(),
            quiz.item_count()
        );

        let report = engine.grade(quiz, &reporter);

        print_summary(&report);

        let writes_files = formats.iter().any(|f| *f != "text");
        if !writes_files {
            continue;
        }

        std::fs::create_dir_all(&output)?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let stem = format!("grade-{}-{timestamp}", quiz.id);

        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("{stem}.json"));
                    report.save_json(&path)?;
                    eprintln!("Results saved to: {}", path.display());
                }
                "html" => {
                    let path = output.join(format!("{stem}.html"));
                    write_html_report(&report, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                "markdown" => {
                    let path = output.join(format!("{stem}.md"));
                    std::fs::write(&path, report.to_markdown())?;
                    eprintln!("Markdown report: {}", path.display());
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn print_summary(report: &GradeReport) {
    use comfy_table::{Cell, Table};

    println!("Quiz: {}", report.quiz.title);

    for section in &report.sections {
        println!("  [{}] {}", section.id, section.summary.text);
        if let Some(average) = &section.summary.average {
            println!("  Average: {average}");
        }
        if let Some(rows) = &section.summary.domains {
            let mut table = Table::new();
            table.set_header(vec!["Domain", "Items", "Total", "Average"]);
            for row in rows {
                table.add_row(vec![
                    Cell::new(&row.label),
                    Cell::new(row.members),
                    Cell::new(format_points(row.total)),
                    Cell::new(&row.average),
                ]);
            }
            println!("{table}");
        }
    }

    println!(
        "Total: {} of {} answered • {} of {} pts",
        report.totals.correct_units,
        report.totals.total_units,
        format_points(report.totals.earned),
        format_points(report.totals.possible)
    );
}
