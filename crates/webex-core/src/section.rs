//! Live section state.
//!
//! A [`Section`] owns its items, their current responses and verdicts,
//! and the reveal flag. Every interaction re-evaluates exactly the item it
//! touches; the summary is recomputed from scratch on demand.

use crate::aggregate::{aggregate_with, SectionSummary};
use crate::config::GradingRules;
use crate::error::QuizError;
use crate::evaluate::evaluate_item;
use crate::model::{Item, ItemResult, ItemSpec, Response, SectionConfig};

/// Outcome of changing a section's reveal flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealChange {
    /// Results are now shown.
    Shown,
    /// Results were hidden and every response and marker was cleared.
    Hidden { cleared: usize },
    /// The flag already had the requested value.
    Unchanged,
}

/// A section of gradable items.
#[derive(Debug, Clone)]
pub struct Section {
    id: String,
    items: Vec<Item>,
    responses: Vec<Option<Response>>,
    results: Vec<ItemResult>,
    config: SectionConfig,
    rules: GradingRules,
}

impl Section {
    pub fn new(
        id: impl Into<String>,
        items: Vec<Item>,
        config: SectionConfig,
        rules: GradingRules,
    ) -> Self {
        let mut section = Self {
            id: id.into(),
            items: Vec::new(),
            responses: Vec::new(),
            results: Vec::new(),
            config,
            rules,
        };
        section.add_items(items);
        section
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Current per-item results in document order.
    pub fn results(&self) -> &[ItemResult] {
        &self.results
    }

    pub fn response(&self, position: usize) -> Option<&Response> {
        self.responses.get(position).and_then(Option::as_ref)
    }

    pub fn config(&self) -> &SectionConfig {
        &self.config
    }

    pub fn is_revealed(&self) -> bool {
        self.config.revealed
    }

    /// Append newly discovered items. They start unanswered; existing
    /// responses are re-evaluated.
    pub fn add_items(&mut self, items: Vec<Item>) {
        for item in items {
            self.responses.push(None);
            self.results.push(evaluate_item(&item, None, &self.rules));
            self.items.push(item);
        }
        self.recompute();
    }

    /// 0-based position of the item with this id.
    pub fn position_of(&self, id: &str) -> Result<usize, QuizError> {
        self.items
            .iter()
            .position(|item| item.id.as_deref() == Some(id))
            .ok_or_else(|| QuizError::UnknownItem(id.to_string()))
    }

    /// Record a response for the item with this id and re-evaluate it.
    pub fn respond(&mut self, id: &str, response: Response) -> Result<&ItemResult, QuizError> {
        let position = self.position_of(id)?;
        self.respond_at(position, response)
    }

    /// Record a response for the item at `position` and re-evaluate it.
    pub fn respond_at(
        &mut self,
        position: usize,
        response: Response,
    ) -> Result<&ItemResult, QuizError> {
        let len = self.items.len();
        let item = self
            .items
            .get(position)
            .ok_or(QuizError::PositionOutOfRange { position, len })?;
        check_shape(item, position, &response)?;

        let result = evaluate_item(item, Some(&response), &self.rules);
        tracing::debug!(
            section = %self.id,
            position,
            verdict = ?result.verdict,
            "item re-evaluated"
        );
        self.responses[position] = Some(response);
        self.results[position] = result;
        Ok(&self.results[position])
    }

    /// Re-evaluate every item from its stored response.
    pub fn recompute(&mut self) {
        self.results = self
            .items
            .iter()
            .zip(&self.responses)
            .map(|(item, response)| evaluate_item(item, response.as_ref(), &self.rules))
            .collect();
    }

    /// Show or hide results. Hiding is a hard reset: responses and
    /// markers are cleared, not just concealed.
    pub fn set_revealed(&mut self, revealed: bool) -> RevealChange {
        if self.config.revealed == revealed {
            return RevealChange::Unchanged;
        }
        self.config.revealed = revealed;
        if revealed {
            return RevealChange::Shown;
        }

        let cleared = self.responses.iter().filter(|r| r.is_some()).count();
        self.responses.iter_mut().for_each(|r| *r = None);
        self.recompute();
        tracing::debug!(section = %self.id, cleared, "section reset");
        RevealChange::Hidden { cleared }
    }

    pub fn toggle_reveal(&mut self) -> RevealChange {
        self.set_revealed(!self.config.revealed)
    }

    /// Aggregate the current results.
    pub fn summary(&self) -> SectionSummary {
        aggregate_with(&self.results, &self.config, &self.rules)
    }
}

fn check_shape(item: &Item, position: usize, response: &Response) -> Result<(), QuizError> {
    let name = || {
        item.id
            .clone()
            .unwrap_or_else(|| format!("#{}", position + 1))
    };
    match (&item.spec, response) {
        (ItemSpec::Solveme(_) | ItemSpec::Select(_), Response::Text(_)) => Ok(()),
        (ItemSpec::RadioGroup(group), Response::Choice(selected)) => {
            if *selected < group.options.len() {
                Ok(())
            } else {
                Err(QuizError::SelectionOutOfRange {
                    item: name(),
                    selected: *selected,
                    options: group.options.len(),
                })
            }
        }
        (spec, Response::Text(_)) => Err(QuizError::ResponseMismatch {
            item: name(),
            kind: spec.kind(),
            response: "text",
        }),
        (spec, Response::Choice(_)) => Err(QuizError::ResponseMismatch {
            item: name(),
            kind: spec.kind(),
            response: "choice",
        }),
    }
}
