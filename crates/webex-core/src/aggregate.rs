//! Section aggregator.
//!
//! Rolls item results up into a section summary: unit counts, point
//! totals, the running average and per-domain sub-totals. A pure function
//! of its inputs, so re-running it after any change is always safe.

use serde::{Deserialize, Serialize};

use crate::config::GradingRules;
use crate::model::{DomainGroup, DomainRef, ItemKind, ItemResult, SectionConfig};

/// Aggregated state of one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// Number of gradable items.
    pub total_units: usize,
    /// Number of items whose verdict is correct.
    pub correct_units: usize,
    /// Points earned across all items.
    pub earned: f64,
    /// Points achievable across all items.
    pub possible: f64,
    /// Status line, e.g. `"3 of 5 answered • 4 of 6 pts"`.
    pub text: String,
    /// Earned points over the average divisor, two decimals. Absent unless
    /// the section is revealed and averaging is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<String>,
    /// Domain rows in declaration order. Absent unless the section is
    /// revealed and at least one domain resolves to an item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<DomainRow>>,
}

/// Sub-total of one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRow {
    pub label: String,
    /// Sum of earned points of the member radio groups.
    pub total: f64,
    /// `total` over the number of resolved members, two decimals.
    pub average: String,
    /// Number of resolved members.
    pub members: usize,
}

/// Aggregate a section under the default rules.
pub fn aggregate(items: &[ItemResult], config: &SectionConfig) -> SectionSummary {
    aggregate_with(items, config, &GradingRules::default())
}

/// Aggregate a section.
pub fn aggregate_with(
    items: &[ItemResult],
    config: &SectionConfig,
    rules: &GradingRules,
) -> SectionSummary {
    let total_units = items.len();
    let correct_units = items.iter().filter(|i| i.is_correct()).count();
    let earned: f64 = items.iter().map(|i| i.earned).sum();
    let possible: f64 = items.iter().map(|i| i.possible).sum();

    let mut text = format!("{correct_units} of {total_units} answered");
    let points_visible =
        config.show_points && (!rules.points_only_when_possible || possible > 0.0);
    if points_visible {
        text.push_str(&format!(
            " • {} of {} pts",
            format_points(earned),
            format_points(possible)
        ));
    }

    let average = (config.revealed && config.average_enabled)
        .then(|| format_average(earned / rules.average_divisor));

    let domains = if config.revealed && !config.domain_groups.is_empty() {
        let rows = domain_rows(items, &config.domain_groups);
        (!rows.is_empty()).then_some(rows)
    } else {
        None
    };

    tracing::debug!(
        total_units,
        correct_units,
        earned,
        possible,
        "aggregated section"
    );

    SectionSummary {
        total_units,
        correct_units,
        earned,
        possible,
        text,
        average,
        domains,
    }
}

/// Resolve every domain against the radio-group items and total them.
///
/// Positions index the radio-group subsequence of `items` (1-based); ids
/// match only radio groups. References that resolve to nothing are
/// dropped, and a domain with no resolved member produces no row.
pub fn domain_rows(items: &[ItemResult], groups: &[DomainGroup]) -> Vec<DomainRow> {
    let radios: Vec<&ItemResult> = items
        .iter()
        .filter(|i| i.kind == ItemKind::RadioGroup)
        .collect();

    groups
        .iter()
        .filter_map(|group| {
            let resolved: Vec<&ItemResult> = group
                .members
                .iter()
                .filter_map(|member| resolve(&radios, member))
                .collect();
            if resolved.is_empty() {
                tracing::debug!(domain = %group.label, "domain resolved to no items");
                return None;
            }
            let total: f64 = resolved.iter().map(|i| i.earned).sum();
            Some(DomainRow {
                label: group.label.clone(),
                total,
                average: format_average(total / resolved.len() as f64),
                members: resolved.len(),
            })
        })
        .collect()
}

fn resolve<'a>(radios: &[&'a ItemResult], member: &DomainRef) -> Option<&'a ItemResult> {
    match member {
        DomainRef::Position(position) => position
            .checked_sub(1)
            .and_then(|index| radios.get(index))
            .copied(),
        DomainRef::Id(id) => radios
            .iter()
            .find(|item| item.id.as_deref() == Some(id.as_str()))
            .copied(),
    }
}

/// Format a point value the way it is shown to readers: whole numbers
/// without a fractional part, everything else in shortest form.
pub fn format_points(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Two-decimal rendering of an average. Ties round away from zero, so
/// 0.125 reads "0.13".
pub fn format_average(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Verdict;

    fn item(kind: ItemKind, verdict: Verdict, earned: f64, possible: f64) -> ItemResult {
        ItemResult {
            id: None,
            kind,
            verdict,
            earned,
            possible,
        }
    }

    fn radio(earned: f64) -> ItemResult {
        item(ItemKind::RadioGroup, Verdict::Incorrect, earned, 5.0)
    }

    fn revealed_with_domains(groups: Vec<DomainGroup>) -> SectionConfig {
        SectionConfig {
            domain_groups: groups,
            ..Default::default()
        }
    }

    #[test]
    fn sums_points_and_counts() {
        let items = vec![
            item(ItemKind::Solveme, Verdict::Correct, 1.0, 1.0),
            item(ItemKind::Select, Verdict::Incorrect, 0.0, 2.0),
            item(ItemKind::RadioGroup, Verdict::Correct, 3.0, 3.0),
            item(ItemKind::Solveme, Verdict::Unanswered, 0.0, 0.0),
        ];
        let summary = aggregate(&items, &SectionConfig::default());
        assert_eq!(summary.total_units, 4);
        assert_eq!(summary.correct_units, 2);
        assert_eq!(summary.earned, 4.0);
        assert_eq!(summary.possible, 6.0);
        assert_eq!(summary.text, "2 of 4 answered • 4 of 6 pts");
    }

    #[test]
    fn show_points_false_suppresses_suffix() {
        let items = vec![item(ItemKind::Solveme, Verdict::Correct, 1.0, 1.0)];
        let config = SectionConfig {
            show_points: false,
            ..Default::default()
        };
        assert_eq!(aggregate(&items, &config).text, "1 of 1 answered");
    }

    #[test]
    fn points_only_when_possible_rule() {
        let items = vec![item(ItemKind::Solveme, Verdict::Correct, 0.0, 0.0)];
        let config = SectionConfig::default();
        assert_eq!(
            aggregate(&items, &config).text,
            "1 of 1 answered • 0 of 0 pts"
        );
        let rules = GradingRules {
            points_only_when_possible: true,
            ..Default::default()
        };
        assert_eq!(
            aggregate_with(&items, &config, &rules).text,
            "1 of 1 answered"
        );
    }

    #[test]
    fn average_uses_divisor_of_five() {
        let items = vec![radio(4.0), radio(6.0)];
        let config = SectionConfig {
            average_enabled: true,
            ..Default::default()
        };
        assert_eq!(aggregate(&items, &config).average.as_deref(), Some("2.00"));
    }

    #[test]
    fn average_absent_when_disabled_or_hidden() {
        let items = vec![radio(10.0)];
        assert!(aggregate(&items, &SectionConfig::default()).average.is_none());

        let hidden = SectionConfig {
            average_enabled: true,
            revealed: false,
            ..Default::default()
        };
        assert!(aggregate(&items, &hidden).average.is_none());
    }

    #[test]
    fn domain_positions_index_radio_groups_only() {
        let items = vec![
            item(ItemKind::Solveme, Verdict::Correct, 7.0, 7.0),
            radio(2.0),
            radio(4.0),
            item(ItemKind::Select, Verdict::Correct, 9.0, 9.0),
            radio(1.0),
            radio(5.0),
        ];
        let config = revealed_with_domains(vec![DomainGroup::parse("Trust", "1,3")]);
        let rows = aggregate(&items, &config).domains.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Trust");
        assert_eq!(rows[0].total, 3.0);
        assert_eq!(rows[0].average, "1.50");
    }

    #[test]
    fn out_of_range_positions_are_dropped() {
        let items = vec![radio(2.0), radio(4.0)];
        let config = revealed_with_domains(vec![
            DomainGroup::parse("Conflict", "2,9"),
            DomainGroup::parse("Ghost", "7,8"),
        ]);
        let rows = aggregate(&items, &config).domains.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Conflict");
        assert_eq!(rows[0].members, 1);
        assert_eq!(rows[0].average, "4.00");
    }

    #[test]
    fn no_resolvable_domain_means_no_table() {
        let items = vec![radio(2.0)];
        let config = revealed_with_domains(vec![DomainGroup::parse("Ghost", "4")]);
        assert!(aggregate(&items, &config).domains.is_none());
    }

    #[test]
    fn domains_keep_declaration_order() {
        let items = vec![radio(1.0), radio(2.0)];
        let config = revealed_with_domains(vec![
            DomainGroup::parse("Zeta", "2"),
            DomainGroup::parse("Alpha", "1"),
        ]);
        let labels: Vec<String> = aggregate(&items, &config)
            .domains
            .unwrap()
            .into_iter()
            .map(|r| r.label)
            .collect();
        assert_eq!(labels, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn domains_resolve_stable_ids() {
        let mut first = radio(3.0);
        first.id = Some("trust-a".into());
        let mut solveme = item(ItemKind::Solveme, Verdict::Correct, 1.0, 1.0);
        solveme.id = Some("trust-b".into());
        let items = vec![solveme, first];
        let config = revealed_with_domains(vec![DomainGroup::new(
            "Trust",
            vec![DomainRef::Id("trust-a".into()), DomainRef::Id("trust-b".into())],
        )]);
        let rows = aggregate(&items, &config).domains.unwrap();
        assert_eq!(rows[0].members, 1);
        assert_eq!(rows[0].total, 3.0);
    }

    #[test]
    fn domains_absent_when_hidden() {
        let items = vec![radio(2.0)];
        let config = SectionConfig {
            revealed: false,
            domain_groups: vec![DomainGroup::parse("Trust", "1")],
            ..Default::default()
        };
        assert!(aggregate(&items, &config).domains.is_none());
    }

    #[test]
    fn aggregate_is_idempotent() {
        let items = vec![radio(2.0), item(ItemKind::Solveme, Verdict::Correct, 1.0, 1.0)];
        let config = SectionConfig {
            average_enabled: true,
            domain_groups: vec![DomainGroup::parse("Trust", "1")],
            ..Default::default()
        };
        assert_eq!(aggregate(&items, &config), aggregate(&items, &config));
    }

    #[test]
    fn empty_section() {
        let summary = aggregate(&[], &SectionConfig::default());
        assert_eq!(summary.text, "0 of 0 answered • 0 of 0 pts");
    }

    #[test]
    fn point_formatting() {
        assert_eq!(format_points(4.0), "4");
        assert_eq!(format_points(0.5), "0.5");
        assert_eq!(format_points(-2.0), "-2");
        assert_eq!(format_points(0.0), "0");
    }

    #[test]
    fn domain_average_rounds_ties_up() {
        let mut items = vec![radio(1.0)];
        items.extend((0..7).map(|_| radio(0.0)));
        let config = SectionConfig {
            domain_groups: vec![DomainGroup::parse("Trust", "1,2,3,4,5,6,7,8")],
            ..Default::default()
        };
        let rows = aggregate(&items, &config).domains.unwrap();
        assert_eq!(rows[0].total, 1.0);
        assert_eq!(rows[0].average, "0.13");
    }

    #[test]
    fn section_average_rounds_ties_up() {
        let items = vec![item(ItemKind::Solveme, Verdict::Correct, 0.625, 1.0)];
        let config = SectionConfig {
            average_enabled: true,
            ..Default::default()
        };
        // 0.625 / 5 = 0.125
        assert_eq!(aggregate(&items, &config).average.as_deref(), Some("0.13"));
    }

    #[test]
    fn average_formatting() {
        assert_eq!(format_average(0.125), "0.13");
        assert_eq!(format_average(0.625), "0.63");
        assert_eq!(format_average(2.0), "2.00");
        assert_eq!(format_average(1.0 / 3.0), "0.33");
    }
}
