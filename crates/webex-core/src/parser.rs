//! TOML quiz document parser.
//!
//! Loads quizzes from TOML files and directories, reads JSON response
//! files, and validates quizzes for common authoring mistakes.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    AnswerSpec, DomainGroup, DomainRef, Item, ItemKind, ItemSpec, MatchFlags, Quiz, QuizSection,
    RadioGroupSpec, RadioOption, Response, SectionConfig, SelectSpec,
};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    sections: Vec<TomlSection>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlSection {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default = "default_true")]
    show_points: bool,
    #[serde(default)]
    average: bool,
    #[serde(default = "default_true")]
    revealed: bool,
    #[serde(default)]
    domains: Vec<TomlDomain>,
    #[serde(default)]
    items: Vec<TomlItem>,
}

#[derive(Debug, Deserialize)]
struct TomlDomain {
    label: String,
    /// Positional list, e.g. `"1,6,10"`.
    #[serde(default)]
    items: Option<String>,
    /// Stable item ids.
    #[serde(default)]
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TomlItem {
    Solveme {
        #[serde(default)]
        id: Option<String>,
        /// JSON-encoded accepted answers.
        #[serde(default)]
        answer: Option<String>,
        #[serde(default)]
        answers: Option<Vec<String>>,
        #[serde(default)]
        ignore_case: bool,
        #[serde(default)]
        ignore_spaces: bool,
        #[serde(default)]
        regex: bool,
        #[serde(default)]
        tol: Option<f64>,
        #[serde(default)]
        points: Option<f64>,
        #[serde(default)]
        response: Option<String>,
    },
    Select {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        points: Option<f64>,
        #[serde(default)]
        response: Option<String>,
    },
    RadioGroup {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        options: Vec<RadioOption>,
        #[serde(default)]
        selected: Option<usize>,
    },
}

fn default_true() -> bool {
    true
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let sections = parsed
        .sections
        .into_iter()
        .map(convert_section)
        .collect();

    Ok(Quiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        sections,
    })
}

fn convert_section(section: TomlSection) -> QuizSection {
    let domain_groups = section
        .domains
        .into_iter()
        .map(|d| {
            let mut group = DomainGroup::parse(d.label, d.items.as_deref().unwrap_or(""));
            group.members.extend(d.ids.into_iter().map(DomainRef::Id));
            group
        })
        .collect();

    let mut radio_count = 0usize;
    let (items, responses) = section
        .items
        .into_iter()
        .map(|item| convert_item(item, &mut radio_count))
        .unzip();

    QuizSection {
        id: section.id,
        title: section.title,
        items,
        responses,
        config: SectionConfig {
            show_points: section.show_points,
            average_enabled: section.average,
            domain_groups,
            revealed: section.revealed,
        },
    }
}

fn convert_item(item: TomlItem, radio_count: &mut usize) -> (Item, Option<Response>) {
    match item {
        TomlItem::Solveme {
            id,
            answer,
            answers,
            ignore_case,
            ignore_spaces,
            regex,
            tol,
            points,
            response,
        } => {
            let flags = MatchFlags {
                ignore_case,
                ignore_spaces,
                use_regex: regex,
            };
            let spec = match (answers, answer) {
                (Some(list), _) => AnswerSpec::new(list, flags),
                (None, Some(json)) => AnswerSpec::from_json(&json, flags),
                (None, None) => AnswerSpec::new(Vec::new(), flags),
            };
            let spec = spec.with_tolerance(tol).with_points(points);
            (
                Item::new(id, ItemSpec::Solveme(spec)),
                response.map(Response::Text),
            )
        }
        TomlItem::Select {
            id,
            points,
            response,
        } => (
            Item::new(id, ItemSpec::Select(SelectSpec::new(points))),
            response.map(Response::Text),
        ),
        TomlItem::RadioGroup {
            id,
            name,
            options,
            selected,
        } => {
            *radio_count += 1;
            let name = name
                .or_else(|| id.clone())
                .unwrap_or_else(|| format!("radio-group-{radio_count}"));
            let options = options
                .into_iter()
                .map(|o| RadioOption::new(o.label, o.value, o.points))
                .collect();
            (
                Item::new(id, ItemSpec::RadioGroup(RadioGroupSpec { name, options })),
                selected.map(Response::Choice),
            )
        }
    }
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// Load a quiz file, or every quiz under a directory.
pub fn load_quizzes(path: &Path) -> Result<Vec<Quiz>> {
    if path.is_dir() {
        load_quiz_directory(path)
    } else {
        Ok(vec![parse_quiz(path)?])
    }
}

/// Read a JSON responses file: an object mapping item ids to typed text
/// (or dropdown value) strings and radio option indices.
pub fn parse_responses(path: &Path) -> Result<HashMap<String, Response>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses: {}", path.display()))?;
    parse_responses_str(&content)
        .with_context(|| format!("failed to parse responses: {}", path.display()))
}

pub fn parse_responses_str(content: &str) -> Result<HashMap<String, Response>> {
    Ok(serde_json::from_str(content)?)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The section ID (if applicable).
    pub section_id: Option<String>,
    /// The item, by id or 1-based position (if applicable).
    pub item: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz for common issues.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate item ids anywhere in the quiz
    let mut seen_ids = HashSet::new();
    for section in &quiz.sections {
        for item in &section.items {
            if let Some(id) = &item.id {
                if !seen_ids.insert(id.as_str()) {
                    warnings.push(ValidationWarning {
                        section_id: Some(section.id.clone()),
                        item: Some(id.clone()),
                        message: format!("duplicate item ID: {id}"),
                    });
                }
            }
        }
    }

    for section in &quiz.sections {
        let warn = |item: Option<String>, message: String| ValidationWarning {
            section_id: Some(section.id.clone()),
            item,
            message,
        };

        if section.items.is_empty() {
            warnings.push(warn(None, "section has no items".into()));
        }

        for (position, item) in section.items.iter().enumerate() {
            let label = item
                .id
                .clone()
                .unwrap_or_else(|| format!("#{}", position + 1));
            warnings.extend(
                item_warnings(item, section.responses.get(position).and_then(Option::as_ref))
                    .into_iter()
                    .map(|message| warn(Some(label.clone()), message)),
            );
        }

        let radio_ids: Vec<Option<&str>> = section
            .items
            .iter()
            .filter(|i| i.kind() == ItemKind::RadioGroup)
            .map(|i| i.id.as_deref())
            .collect();
        for group in &section.config.domain_groups {
            if group.members.is_empty() {
                warnings.push(warn(
                    None,
                    format!("domain '{}' lists no items", group.label),
                ));
            }
            for member in &group.members {
                let resolves = match member {
                    DomainRef::Position(p) => *p >= 1 && *p <= radio_ids.len(),
                    DomainRef::Id(id) => radio_ids.contains(&Some(id.as_str())),
                };
                if !resolves {
                    warnings.push(warn(
                        None,
                        format!(
                            "domain '{}' references {} which is not a radio group",
                            group.label,
                            describe(member)
                        ),
                    ));
                }
            }
        }
    }

    warnings
}

fn item_warnings(item: &Item, response: Option<&Response>) -> Vec<String> {
    let mut messages = Vec::new();
    match &item.spec {
        ItemSpec::Solveme(spec) => {
            if spec.accepted().is_empty() {
                messages.push("solveme item has no accepted answers".into());
            }
            if matches!(response, Some(Response::Choice(_))) {
                messages.push("solveme response must be text".into());
            }
        }
        ItemSpec::Select(_) => {
            if matches!(response, Some(Response::Choice(_))) {
                messages.push("select response must be an option value".into());
            }
        }
        ItemSpec::RadioGroup(group) => {
            match group.answer_option() {
                None => messages.push("radio group has no option with value \"answer\"".into()),
                Some(answer) if answer.points < group.possible_points() => messages.push(format!(
                    "answer option is worth {} points but another option is worth {}",
                    answer.points,
                    group.possible_points()
                )),
                Some(_) => {}
            }
            match response {
                Some(Response::Choice(selected)) if *selected >= group.options.len() => {
                    messages.push(format!(
                        "selected option {selected} does not exist ({} options)",
                        group.options.len()
                    ))
                }
                Some(Response::Text(_)) => {
                    messages.push("radio group response must be an option index".into())
                }
                _ => {}
            }
        }
    }
    messages
}

fn describe(member: &DomainRef) -> String {
    match member {
        DomainRef::Position(p) => format!("position {p}"),
        DomainRef::Id(id) => format!("item '{id}'"),
    }
}
