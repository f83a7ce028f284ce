//! HTML rendering.
//!
//! Section fragments mirror what the quiz page shows under each section;
//! the full report is a self-contained page with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use webex_core::aggregate::{format_points, DomainRow, SectionSummary};
use webex_core::model::Verdict;
use webex_core::report::{GradeReport, SectionReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Render the summary block of one section.
///
/// Always emits the status span. The average line and the domain table are
/// emitted only when the summary carries them.
pub fn render_section_html(summary: &SectionSummary) -> String {
    let mut html = format!(
        "<span class=\"webex-total_correct\" role=\"status\" aria-live=\"polite\">{}</span>\n",
        html_escape(&summary.text)
    );
    if let Some(average) = &summary.average {
        html.push_str(&format!(
            "<div class=\"webex-average\">Average: {}</div>\n",
            html_escape(average)
        ));
    }
    if let Some(rows) = &summary.domains {
        html.push_str(&render_domain_table(rows));
    }
    html
}

/// Render domain rows as a table, in the order given.
pub fn render_domain_table(rows: &[DomainRow]) -> String {
    let mut html = String::from("<table class=\"webex-domains\">\n");
    html.push_str("<thead><tr><th>Domain</th><th>Total</th><th>Average</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&row.label),
            format_points(row.total),
            html_escape(&row.average)
        ));
    }
    html.push_str("</tbody></table>\n");
    html
}

/// Generate an HTML page from a grade report.
pub fn generate_html(report: &GradeReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>webex grades: {}</title>\n",
        html_escape(&report.quiz.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&report.quiz.title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} sections | {} items | {} of {} answered | {} of {} pts | {}</p>\n",
        report.quiz.section_count,
        report.quiz.item_count,
        report.totals.correct_units,
        report.totals.total_units,
        format_points(report.totals.earned),
        format_points(report.totals.possible),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ratio) = report.totals.ratio() {
        html.push_str(&format!(
            "<p class=\"score\">Score: {:.1}%</p>\n",
            ratio * 100.0
        ));
    }
    html.push_str("</header>\n");

    if report.sections.iter().any(|s| s.summary.possible > 0.0) {
        html.push_str("<section class=\"dashboard\">\n<h2>Points by section</h2>\n");
        html.push_str(&generate_bar_chart(&report.sections));
        html.push_str("</section>\n");
    }

    for section in &report.sections {
        html.push_str(&render_section_report(section));
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn render_section_report(section: &SectionReport) -> String {
    let title = if section.title.is_empty() {
        &section.id
    } else {
        &section.title
    };
    let mut html = format!(
        "<section class=\"webex-check\" id=\"{}\">\n<h2>{}</h2>\n",
        html_escape(&section.id),
        html_escape(title)
    );

    html.push_str("<table class=\"items\">\n");
    html.push_str(
        "<thead><tr><th>#</th><th>Item</th><th>Kind</th><th>Result</th><th>Points</th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");
    for (i, item) in section.items.iter().enumerate() {
        let (class, label) = match item.verdict {
            Verdict::Correct => ("webex-correct", "correct"),
            Verdict::Incorrect => ("webex-incorrect", "incorrect"),
            Verdict::Unanswered => ("unanswered", "-"),
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} / {}</td></tr>\n",
            class,
            i + 1,
            html_escape(item.id.as_deref().unwrap_or("")),
            item.kind,
            label,
            format_points(item.earned),
            format_points(item.possible)
        ));
    }
    html.push_str("</tbody></table>\n");

    html.push_str(&render_section_html(&section.summary));
    html.push_str("</section>\n");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &GradeReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(sections: &[SectionReport]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let scored: Vec<(&str, f64)> = sections
        .iter()
        .filter(|s| s.summary.possible > 0.0)
        .map(|s| (s.id.as_str(), s.summary.earned / s.summary.possible))
        .collect();

    let total_height = scored.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (id, ratio)) in scored.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (ratio.clamp(0.0, 1.0) * max_width as f64) as usize;

        let color = if *ratio >= 0.8 {
            "#22c55e"
        } else if *ratio >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(id)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            ratio * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.webex-correct { background: var(--pass); }
.webex-incorrect { background: var(--fail); }
.webex-total_correct { display: block; font-weight: bold; margin: 0.5rem 0; }
.webex-average { margin: 0.5rem 0; }
table.webex-domains { width: auto; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use webex_core::config::GradingRules;
    use webex_core::model::{ItemKind, ItemResult};
    use webex_core::report::{QuizSummary, QuizTotals};

    fn make_summary(average: Option<&str>, domains: Option<Vec<DomainRow>>) -> SectionSummary {
        SectionSummary {
            total_units: 2,
            correct_units: 1,
            earned: 3.0,
            possible: 5.0,
            text: "1 of 2 answered • 3 of 5 pts".into(),
            average: average.map(String::from),
            domains,
        }
    }

    fn make_test_report() -> GradeReport {
        let sections = vec![SectionReport {
            id: "part-1".into(),
            title: "Part <1>".into(),
            summary: make_summary(
                Some("0.60"),
                Some(vec![DomainRow {
                    label: "Trust".into(),
                    total: 3.0,
                    average: "1.50".into(),
                    members: 2,
                }]),
            ),
            items: vec![
                ItemResult {
                    id: Some("capital".into()),
                    kind: ItemKind::Solveme,
                    verdict: Verdict::Correct,
                    earned: 3.0,
                    possible: 3.0,
                },
                ItemResult {
                    id: None,
                    kind: ItemKind::RadioGroup,
                    verdict: Verdict::Incorrect,
                    earned: 0.0,
                    possible: 2.0,
                },
            ],
        }];
        GradeReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            quiz: QuizSummary {
                id: "quiz".into(),
                title: "Test Quiz".into(),
                section_count: 1,
                item_count: 2,
            },
            rules: GradingRules::default(),
            totals: QuizTotals::from_sections(&sections),
            sections,
        }
    }

    #[test]
    fn section_fragment_without_extras() {
        let html = render_section_html(&make_summary(None, None));
        assert!(html.contains("role=\"status\""));
        assert!(html.contains("aria-live=\"polite\""));
        assert!(html.contains("1 of 2 answered"));
        assert!(!html.contains("webex-average"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn section_fragment_with_average_and_domains() {
        let rows = vec![
            DomainRow {
                label: "Conflict".into(),
                total: 4.0,
                average: "2.00".into(),
                members: 2,
            },
            DomainRow {
                label: "Trust & Care".into(),
                total: 1.5,
                average: "0.75".into(),
                members: 2,
            },
        ];
        let html = render_section_html(&make_summary(Some("0.60"), Some(rows)));
        assert!(html.contains("Average: 0.60"));
        assert!(html.contains("<tr><td>Conflict</td><td>4</td><td>2.00</td></tr>"));
        assert!(html.contains("Trust &amp; Care"));
        assert!(html.find("Conflict").unwrap() < html.find("Trust").unwrap());
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Test Quiz"));
        assert!(html.contains("Part &lt;1&gt;"));
        assert!(html.contains("capital"));
        assert!(html.contains("webex-correct"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn html_report_shows_overall_score() {
        let html = generate_html(&make_test_report());
        // 3 of 5 points
        assert!(html.contains("Score: 60.0%"));

        let mut unscored = make_test_report();
        for section in &mut unscored.sections {
            section.summary.possible = 0.0;
        }
        unscored.totals = QuizTotals::from_sections(&unscored.sections);
        assert!(!generate_html(&unscored).contains("Score:"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
