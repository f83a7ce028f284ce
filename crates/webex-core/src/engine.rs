//! Quiz grading orchestrator.
//!
//! Replays each section's recorded responses through a live [`Section`]
//! and collects the resulting summaries into a [`GradeReport`].

use chrono::Utc;
use uuid::Uuid;

use crate::aggregate::SectionSummary;
use crate::config::GradingRules;
use crate::error::QuizError;
use crate::model::{ItemResult, Quiz, QuizSection};
use crate::report::{GradeReport, QuizSummary, QuizTotals, SectionReport};
use crate::section::Section;

/// Progress reporting trait.
pub trait GradeReporter {
    fn on_item_graded(&self, section_id: &str, position: usize, result: &ItemResult);
    fn on_response_error(&self, section_id: &str, error: &QuizError);
    fn on_section_complete(&self, section_id: &str, summary: &SectionSummary);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl GradeReporter for NoopReporter {
    fn on_item_graded(&self, _: &str, _: usize, _: &ItemResult) {}
    fn on_response_error(&self, _: &str, _: &QuizError) {}
    fn on_section_complete(&self, _: &str, _: &SectionSummary) {}
}

/// The quiz grading engine.
#[derive(Debug, Clone, Default)]
pub struct GradingEngine {
    rules: GradingRules,
}

impl GradingEngine {
    pub fn new(rules: GradingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &GradingRules {
        &self.rules
    }

    /// Build a live section from a quiz section and replay its responses.
    ///
    /// A response that does not fit its item is reported and skipped; the
    /// item stays unanswered and its siblings are graded normally.
    pub fn build_section(&self, def: &QuizSection, reporter: &dyn GradeReporter) -> Section {
        let mut section = Section::new(
            def.id.clone(),
            def.items.clone(),
            def.config.clone(),
            self.rules,
        );
        for (position, response) in def.responses.iter().enumerate() {
            let Some(response) = response else { continue };
            match section.respond_at(position, response.clone()) {
                Ok(result) => reporter.on_item_graded(&def.id, position, result),
                Err(e) => {
                    tracing::warn!("section '{}': {}", def.id, e);
                    reporter.on_response_error(&def.id, &e);
                }
            }
        }
        section
    }

    /// Grade every section of a quiz.
    pub fn grade(&self, quiz: &Quiz, reporter: &dyn GradeReporter) -> GradeReport {
        let sections: Vec<SectionReport> = quiz
            .sections
            .iter()
            .map(|def| {
                let section = self.build_section(def, reporter);
                let summary = section.summary();
                reporter.on_section_complete(&def.id, &summary);
                SectionReport {
                    id: def.id.clone(),
                    title: def.title.clone(),
                    summary,
                    items: section.results().to_vec(),
                }
            })
            .collect();

        tracing::info!(
            quiz = %quiz.id,
            sections = sections.len(),
            "graded quiz"
        );

        GradeReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            quiz: QuizSummary {
                id: quiz.id.clone(),
                title: quiz.title.clone(),
                section_count: quiz.sections.len(),
                item_count: quiz.item_count(),
            },
            rules: self.rules,
            totals: QuizTotals::from_sections(&sections),
            sections,
        }
    }
}
