//! Grade report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{format_points, SectionSummary};
use crate::config::GradingRules;
use crate::model::ItemResult;

/// A complete grade report for one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the graded quiz.
    pub quiz: QuizSummary,
    /// Rules the quiz was graded under.
    pub rules: GradingRules,
    /// Per-section results.
    pub sections: Vec<SectionReport>,
    /// Totals across every section.
    pub totals: QuizTotals,
}

/// Summary of a quiz (without the item definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub section_count: usize,
    pub item_count: usize,
}

/// Results of one section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionReport {
    pub id: String,
    pub title: String,
    pub summary: SectionSummary,
    pub items: Vec<ItemResult>,
}

/// Unit and point totals across a whole quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizTotals {
    pub total_units: usize,
    pub correct_units: usize,
    pub earned: f64,
    pub possible: f64,
}

impl QuizTotals {
    pub fn from_sections(sections: &[SectionReport]) -> Self {
        sections.iter().fold(Self::default(), |acc, s| Self {
            total_units: acc.total_units + s.summary.total_units,
            correct_units: acc.correct_units + s.summary.correct_units,
            earned: acc.earned + s.summary.earned,
            possible: acc.possible + s.summary.possible,
        })
    }

    /// Earned over possible, or `None` for an unscored quiz.
    pub fn ratio(&self) -> Option<f64> {
        (self.possible > 0.0).then(|| self.earned / self.possible)
    }
}

impl GradeReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.quiz.title));
        md.push_str(&format!(
            "**Total:** {} of {} answered • {} of {} pts\n\n",
            self.totals.correct_units,
            self.totals.total_units,
            format_points(self.totals.earned),
            format_points(self.totals.possible)
        ));

        for section in &self.sections {
            let title = if section.title.is_empty() {
                &section.id
            } else {
                &section.title
            };
            md.push_str(&format!("### {title}\n\n{}\n", section.summary.text));
            if let Some(average) = &section.summary.average {
                md.push_str(&format!("\nAverage: {average}\n"));
            }
            if let Some(rows) = &section.summary.domains {
                md.push_str("\n| Domain | Total | Average |\n");
                md.push_str("|--------|-------|---------|\n");
                for row in rows {
                    md.push_str(&format!(
                        "| {} | {} | {} |\n",
                        row.label,
                        format_points(row.total),
                        row.average
                    ));
                }
            }
            md.push('\n');
        }

        md
    }
}
