//! Core data model types for webex grading.
//!
//! These are the types the evaluator and aggregator operate on: answer
//! specifications for each widget kind, per-item results, and section
//! configuration.

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Option value that marks the correct choice of a dropdown or radio group.
pub const ANSWER_VALUE: &str = "answer";

/// Option value that marks the neutral, unanswered choice of a dropdown.
pub const BLANK_VALUE: &str = "blank";

/// The kind of gradable widget an item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Solveme,
    Select,
    RadioGroup,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Solveme => write!(f, "solveme"),
            ItemKind::Select => write!(f, "select"),
            ItemKind::RadioGroup => write!(f, "radiogroup"),
        }
    }
}

/// Tri-state correctness of a single item.
///
/// `Unanswered` clears both markers in the presentation layer but counts
/// as "not correct" when tallying a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
}

impl Verdict {
    pub fn from_hit(hit: bool) -> Self {
        if hit {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }
}

/// Output of the item evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    /// Stable identifier of the item, when the document assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Widget kind.
    pub kind: ItemKind,
    /// Correctness verdict.
    pub verdict: Verdict,
    /// Points earned by the current response.
    pub earned: f64,
    /// Points achievable for this item (0 for unscored items).
    pub possible: f64,
}

impl ItemResult {
    /// A cleared result: no marker, nothing earned, possible points kept.
    pub fn cleared(kind: ItemKind, possible: f64) -> Self {
        Self {
            id: None,
            kind,
            verdict: Verdict::Unanswered,
            earned: 0.0,
            possible,
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn is_correct(&self) -> bool {
        self.verdict.is_correct()
    }
}

// ---------------------------------------------------------------------------
// Answer specifications
// ---------------------------------------------------------------------------

/// Matching flags of a text-input item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFlags {
    /// Compare lowercased.
    #[serde(default)]
    pub ignore_case: bool,
    /// Strip space characters before comparing.
    #[serde(default)]
    pub ignore_spaces: bool,
    /// Treat the accepted answers as regex alternatives.
    #[serde(default)]
    pub use_regex: bool,
}

impl MatchFlags {
    /// Apply the case and space normalization these flags ask for.
    pub fn normalize(&self, value: &str) -> String {
        let mut out = if self.ignore_case {
            value.to_lowercase()
        } else {
            value.to_string()
        };
        if self.ignore_spaces {
            out.retain(|c| c != ' ');
        }
        out
    }
}

/// Answer specification of a text-input ("solveme") item.
///
/// Accepted answers are normalized once at construction, so evaluation
/// only normalizes the response.
#[derive(Debug, Clone)]
pub struct AnswerSpec {
    raw: Vec<String>,
    accepted: Vec<String>,
    flags: MatchFlags,
    tolerance: Option<f64>,
    points: Option<f64>,
    raw_pattern: Option<Regex>,
    normalized_pattern: Option<Regex>,
}

impl AnswerSpec {
    pub fn new(answers: Vec<String>, flags: MatchFlags) -> Self {
        let accepted: Vec<String> = answers.iter().map(|a| flags.normalize(a)).collect();
        let (raw_pattern, normalized_pattern) = if flags.use_regex {
            (alternation(&answers), alternation(&accepted))
        } else {
            (None, None)
        };
        Self {
            raw: answers,
            accepted,
            flags,
            tolerance: None,
            points: None,
            raw_pattern,
            normalized_pattern,
        }
    }

    /// Build a spec from JSON-encoded answer data.
    ///
    /// Malformed JSON or a non-array document decodes to an empty list, so
    /// the item can never be correct. Numbers and booleans are stringified.
    pub fn from_json(raw: &str, flags: MatchFlags) -> Self {
        Self::new(decode_answers(raw), flags)
    }

    /// Numeric tolerance; ignored unless finite.
    pub fn with_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.tolerance = tolerance.filter(|t| t.is_finite());
        self
    }

    pub fn with_points(mut self, points: Option<f64>) -> Self {
        self.points = points.filter(|p| p.is_finite());
        self
    }

    /// Accepted answers as written.
    pub fn raw_answers(&self) -> &[String] {
        &self.raw
    }

    /// Accepted answers after case/space normalization.
    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    pub fn flags(&self) -> MatchFlags {
        self.flags
    }

    pub fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }

    pub fn points(&self) -> Option<f64> {
        self.points
    }

    pub(crate) fn pattern(&self, source: RegexSource) -> Option<&Regex> {
        match source {
            RegexSource::Raw => self.raw_pattern.as_ref(),
            RegexSource::Normalized => self.normalized_pattern.as_ref(),
        }
    }
}

/// Compile the answers into one alternation. An empty list or a pattern
/// that fails to compile yields `None` ("no regex match").
fn alternation(answers: &[String]) -> Option<Regex> {
    if answers.is_empty() {
        return None;
    }
    match Regex::new(&answers.join("|")) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!("ignoring invalid answer pattern: {e}");
            None
        }
    }
}

fn decode_answers(raw: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(values)) => values
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        Ok(_) => {
            tracing::warn!("answer data is not a JSON array, treating as empty");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("malformed answer data ({e}), treating as empty");
            Vec::new()
        }
    }
}

/// Which answer list feeds a regex-mode item, and which response it is
/// tested against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegexSource {
    /// Normalized answers tested against the normalized response.
    #[default]
    Normalized,
    /// Answers as written tested against the response as typed.
    Raw,
}

/// Answer specification of a dropdown item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectSpec {
    #[serde(default)]
    pub points: Option<f64>,
}

impl SelectSpec {
    /// Non-finite points leave the dropdown unscored.
    pub fn new(points: Option<f64>) -> Self {
        Self {
            points: points.filter(|p| p.is_finite()),
        }
    }
}

/// One option of a radio group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioOption {
    /// Visible label text.
    #[serde(default)]
    pub label: String,
    /// Option value; `"answer"` marks the correct option.
    #[serde(default)]
    pub value: String,
    /// Points awarded when this option is selected.
    #[serde(default)]
    pub points: f64,
}

impl RadioOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>, points: f64) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            points: if points.is_finite() { points } else { 0.0 },
        }
    }

    pub fn is_answer(&self) -> bool {
        self.value == ANSWER_VALUE
    }
}

/// A named set of mutually exclusive options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioGroupSpec {
    pub name: String,
    #[serde(default)]
    pub options: Vec<RadioOption>,
}

impl RadioGroupSpec {
    /// Best achievable score: the maximum option points, never below 0.
    pub fn possible_points(&self) -> f64 {
        max_points(&self.options)
    }

    pub fn answer_option(&self) -> Option<&RadioOption> {
        self.options.iter().find(|o| o.is_answer())
    }
}

pub(crate) fn max_points(options: &[RadioOption]) -> f64 {
    options.iter().map(|o| o.points).fold(0.0, f64::max)
}

/// Answer specification of any item.
#[derive(Debug, Clone)]
pub enum ItemSpec {
    Solveme(AnswerSpec),
    Select(SelectSpec),
    RadioGroup(RadioGroupSpec),
}

impl ItemSpec {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemSpec::Solveme(_) => ItemKind::Solveme,
            ItemSpec::Select(_) => ItemKind::Select,
            ItemSpec::RadioGroup(_) => ItemKind::RadioGroup,
        }
    }

    /// Points the item contributes to the section's possible total.
    pub fn possible_points(&self) -> f64 {
        match self {
            ItemSpec::Solveme(spec) => spec.points().unwrap_or(0.0),
            ItemSpec::Select(spec) => spec.points.unwrap_or(0.0),
            ItemSpec::RadioGroup(spec) => spec.possible_points(),
        }
    }
}

/// A gradable item: its spec and optional stable identifier.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: Option<String>,
    pub spec: ItemSpec,
}

impl Item {
    pub fn new(id: Option<String>, spec: ItemSpec) -> Self {
        Self { id, spec }
    }

    pub fn kind(&self) -> ItemKind {
        self.spec.kind()
    }
}

/// The current raw value of a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// Typed text, or the value of the chosen dropdown option.
    Text(String),
    /// Index of the selected radio option.
    Choice(usize),
}

// ---------------------------------------------------------------------------
// Section configuration
// ---------------------------------------------------------------------------

/// A reference from a domain to one radio-group item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainRef {
    /// 1-based position among the section's radio groups.
    Position(usize),
    /// Stable item identifier.
    Id(String),
}

/// A named subset of a section's radio groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainGroup {
    pub label: String,
    pub members: Vec<DomainRef>,
}

impl DomainGroup {
    pub fn new(label: impl Into<String>, members: Vec<DomainRef>) -> Self {
        Self {
            label: label.into(),
            members,
        }
    }

    /// Parse the positional list format (`"1,6,10"`). Tokens that are not
    /// positive integers are dropped.
    pub fn parse(label: impl Into<String>, positions: &str) -> Self {
        let members = positions
            .split(',')
            .filter_map(|token| token.trim().parse::<usize>().ok())
            .filter(|&p| p >= 1)
            .map(DomainRef::Position)
            .collect();
        Self::new(label, members)
    }
}

/// Section-level configuration passed to the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Append the points suffix to the summary text.
    #[serde(default = "default_true")]
    pub show_points: bool,
    /// Show the earned/divisor average while revealed.
    #[serde(default)]
    pub average_enabled: bool,
    /// Domain groups in declaration order.
    #[serde(default)]
    pub domain_groups: Vec<DomainGroup>,
    /// Whether results are currently shown.
    #[serde(default = "default_true")]
    pub revealed: bool,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            show_points: true,
            average_enabled: false,
            domain_groups: Vec::new(),
            revealed: true,
        }
    }
}

/// Marker that suppresses the points suffix.
pub const NO_POINTS_MARKER: &str = "nopoints";
/// Marker that enables the running average.
pub const AVERAGE_MARKER: &str = "average";
/// Marker of a section whose results are hidden.
pub const UNCHECKED_MARKER: &str = "unchecked";

impl SectionConfig {
    /// Derive configuration from presentation-layer markers.
    ///
    /// `markers` are the section's marker classes; `attributes` its
    /// name/value attributes. Every attribute whose name appears in
    /// `domain_names` becomes a domain, in `domain_names` order, labelled
    /// with the capitalized attribute name.
    pub fn from_markers<'a>(
        markers: &[&str],
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
        domain_names: &[&str],
    ) -> Self {
        let attributes: Vec<(&str, &str)> = attributes.into_iter().collect();
        let domain_groups = domain_names
            .iter()
            .filter_map(|name| {
                attributes
                    .iter()
                    .find(|(attr, _)| attr.eq_ignore_ascii_case(name))
                    .map(|(_, value)| DomainGroup::parse(capitalize(name), value))
            })
            .collect();

        Self {
            show_points: !markers.contains(&NO_POINTS_MARKER),
            average_enabled: markers.contains(&AVERAGE_MARKER),
            domain_groups,
            revealed: !markers.contains(&UNCHECKED_MARKER),
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Quiz documents
// ---------------------------------------------------------------------------

/// One section of a quiz document.
#[derive(Debug, Clone)]
pub struct QuizSection {
    /// Section identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Items in document order.
    pub items: Vec<Item>,
    /// Recorded responses, aligned with `items`.
    pub responses: Vec<Option<Response>>,
    /// Section configuration.
    pub config: SectionConfig,
}

/// A quiz document: a set of sections.
#[derive(Debug, Clone)]
pub struct Quiz {
    /// Unique identifier of this quiz.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Description of this quiz.
    pub description: String,
    /// The sections in document order.
    pub sections: Vec<QuizSection>,
}

impl Quiz {
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Override recorded responses by item id. Returns the ids that match
    /// no item, sorted.
    pub fn apply_responses(&mut self, responses: &HashMap<String, Response>) -> Vec<String> {
        let mut matched = HashSet::new();
        for section in &mut self.sections {
            for (item, slot) in section.items.iter().zip(section.responses.iter_mut()) {
                let Some(id) = &item.id else { continue };
                if let Some(response) = responses.get(id) {
                    *slot = Some(response.clone());
                    matched.insert(id.clone());
                }
            }
        }
        let mut unmatched: Vec<String> = responses
            .keys()
            .filter(|id| !matched.contains(*id))
            .cloned()
            .collect();
        unmatched.sort();
        unmatched
    }
}
