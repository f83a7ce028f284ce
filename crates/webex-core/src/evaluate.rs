//! Item evaluator.
//!
//! Stateless: every function is a pure mapping from (response, spec) to an
//! [`ItemResult`]. Malformed specs degrade to "no credit", never to an error.

use crate::config::GradingRules;
use crate::model::{
    max_points, AnswerSpec, Item, ItemKind, ItemResult, ItemSpec, RadioOption, RegexSource,
    Response, SelectSpec, Verdict, ANSWER_VALUE, BLANK_VALUE,
};

/// Evaluate a text-input item under the default rules.
pub fn evaluate_solveme(response: &str, spec: &AnswerSpec) -> ItemResult {
    evaluate_solveme_with(response, spec, &GradingRules::default())
}

/// Evaluate a text-input item.
///
/// A literal match, a numeric match within tolerance, or a regex match
/// each make the response correct; none of them can downgrade another.
pub fn evaluate_solveme_with(response: &str, spec: &AnswerSpec, rules: &GradingRules) -> ItemResult {
    let flags = spec.flags();
    let normalized = flags.normalize(response);

    if normalized.is_empty() {
        return unanswered(ItemKind::Solveme, spec.points());
    }

    let mut hit = spec.accepted().iter().any(|a| *a == normalized);

    if let Some(tolerance) = spec.tolerance() {
        if let Some(value) = to_number(&normalized) {
            let within = spec
                .accepted()
                .iter()
                .filter_map(|a| to_number(a))
                .any(|a| (a - value).abs() < tolerance);
            hit = hit || within;
        }
    }

    if flags.use_regex && !hit {
        if let Some(pattern) = spec.pattern(rules.regex_source) {
            let subject = match rules.regex_source {
                RegexSource::Normalized => normalized.as_str(),
                RegexSource::Raw => response,
            };
            hit = pattern.is_match(subject);
        }
    }

    tracing::debug!(response, hit, "evaluated solveme");
    scored(ItemKind::Solveme, Verdict::from_hit(hit), spec.points())
}

/// Evaluate a dropdown item under the default rules.
pub fn evaluate_select(value: &str, spec: &SelectSpec) -> ItemResult {
    evaluate_select_with(value, spec, &GradingRules::default())
}

/// Evaluate a dropdown item.
///
/// `"answer"` is correct, `"blank"` is unanswered, anything else is
/// incorrect. With `select_marks_correctness` off the dropdown is always
/// unanswered.
pub fn evaluate_select_with(value: &str, spec: &SelectSpec, rules: &GradingRules) -> ItemResult {
    if !rules.select_marks_correctness || value == BLANK_VALUE {
        return unanswered(ItemKind::Select, spec.points);
    }
    scored(
        ItemKind::Select,
        Verdict::from_hit(value == ANSWER_VALUE),
        spec.points,
    )
}

/// Evaluate a radio group.
///
/// `possible` is the highest option value, not the value of the option
/// flagged as the answer. `earned` is the selected option's value whether
/// or not that option is the answer.
pub fn evaluate_radio_group(selected: Option<&RadioOption>, options: &[RadioOption]) -> ItemResult {
    let possible = max_points(options);
    match selected {
        None => ItemResult::cleared(ItemKind::RadioGroup, possible),
        Some(option) => ItemResult {
            id: None,
            kind: ItemKind::RadioGroup,
            verdict: Verdict::from_hit(option.value == ANSWER_VALUE),
            earned: if option.points.is_finite() {
                option.points
            } else {
                0.0
            },
            possible,
        },
    }
}

/// Evaluate any item against its current response.
///
/// A missing response, or one whose shape does not fit the item (text for a
/// radio group, an index past the last option), evaluates as unanswered.
pub fn evaluate_item(item: &Item, response: Option<&Response>, rules: &GradingRules) -> ItemResult {
    let result = match (&item.spec, response) {
        (ItemSpec::Solveme(spec), Some(Response::Text(text))) => {
            evaluate_solveme_with(text, spec, rules)
        }
        (ItemSpec::Select(spec), Some(Response::Text(value))) => {
            evaluate_select_with(value, spec, rules)
        }
        (ItemSpec::RadioGroup(group), Some(Response::Choice(index))) => {
            evaluate_radio_group(group.options.get(*index), &group.options)
        }
        (spec, _) => ItemResult::cleared(spec.kind(), spec.possible_points()),
    };
    result.with_id(item.id.clone())
}

fn unanswered(kind: ItemKind, points: Option<f64>) -> ItemResult {
    ItemResult::cleared(kind, points.unwrap_or(0.0))
}

fn scored(kind: ItemKind, verdict: Verdict, points: Option<f64>) -> ItemResult {
    let possible = points.unwrap_or(0.0);
    ItemResult {
        id: None,
        kind,
        verdict,
        earned: if verdict.is_correct() { possible } else { 0.0 },
        possible,
    }
}

/// Coerce text to a number: surrounding whitespace is ignored, blank text
/// is 0, and non-finite values are not numbers.
pub(crate) fn to_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
