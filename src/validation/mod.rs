//! Validation
//!
//! Checks a [`Selection`] against the rules of each option group. Outcomes are
//! plain data: a [`ValidationReport`] holding the unmet rules the shopper can
//! fix, and the configuration errors they cannot.

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;
use tracing::warn;

use crate::{
    catalog::groups::OptionGroup,
    selection::{Selection, Tally},
};

/// A rule the shopper's selection does not meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The group is required and nothing is selected.
    Required,

    /// Fewer distinct options than `min_selections`.
    TooFewSelections {
        /// Minimum selections
        min: u32,
        /// Options selected
        actual: u64,
    },

    /// More distinct options than `max_selections`.
    TooManySelections {
        /// Maximum selections
        max: u32,
        /// Options selected
        actual: u64,
    },

    /// Summed quantity below `min_total_qty`.
    TooFewItems {
        /// Minimum total quantity
        min: u32,
        /// Quantity selected
        actual: u64,
    },

    /// Summed quantity above `max_total_qty`.
    TooManyItems {
        /// Maximum total quantity
        max: u32,
        /// Quantity selected
        actual: u64,
    },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Required => f.write_str("is required"),
            ViolationKind::TooFewSelections { min, .. } => {
                write!(f, "needs at least {min} {}", counted(*min, "option"))
            }
            ViolationKind::TooManySelections { max, .. } => {
                write!(f, "allows at most {max} {}", counted(*max, "option"))
            }
            ViolationKind::TooFewItems { min, .. } => {
                write!(f, "needs at least {min} {}", counted(*min, "item"))
            }
            ViolationKind::TooManyItems { max, .. } => {
                write!(f, "allows at most {max} {}", counted(*max, "item"))
            }
        }
    }
}

fn counted(count: u32, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}

/// An unmet rule, tied to the group it belongs to.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{label} {kind}")]
pub struct Violation {
    /// Group id
    pub group_id: String,

    /// Group label
    pub label: String,

    /// Which rule
    pub kind: ViolationKind,
}

/// A group definition no selection can satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// `min_selections` is above `max_selections`.
    SelectionBoundsInverted {
        /// Minimum selections
        min: u32,
        /// Maximum selections
        max: u32,
    },

    /// `min_total_qty` is above `max_total_qty`.
    TotalQtyBoundsInverted {
        /// Minimum total quantity
        min: u32,
        /// Maximum total quantity
        max: u32,
    },

    /// Every option at its maximum still falls short of `min_total_qty`.
    UnreachableMinTotalQty {
        /// Minimum total quantity
        min: u32,
        /// Highest reachable total
        reachable: u64,
    },
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorKind::SelectionBoundsInverted { min, max } => {
                write!(f, "minimum selections {min} exceed maximum {max}")
            }
            ConfigErrorKind::TotalQtyBoundsInverted { min, max } => {
                write!(f, "minimum total quantity {min} exceeds maximum {max}")
            }
            ConfigErrorKind::UnreachableMinTotalQty { min, reachable } => {
                write!(f, "minimum total quantity {min} is above the reachable {reachable}")
            }
        }
    }
}

/// A misconfigured group. Checkout stays blocked whatever is selected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{label} is misconfigured ({kind}), please contact support")]
pub struct GroupConfigError {
    /// Group id
    pub group_id: String,

    /// Group label
    pub label: String,

    /// What is wrong
    pub kind: ConfigErrorKind,
}

/// Configuration errors for a group, independent of any selection.
pub fn group_config_errors(group: &OptionGroup<'_>) -> SmallVec<[GroupConfigError; 2]> {
    let mut kinds: SmallVec<[ConfigErrorKind; 2]> = SmallVec::new();

    if let (Some(min), Some(max)) = (group.min_selections, group.max_selections)
        && min > max
    {
        kinds.push(ConfigErrorKind::SelectionBoundsInverted { min, max });
    }

    if let (Some(min), Some(max)) = (group.min_total_qty, group.max_total_qty) {
        if min > max {
            kinds.push(ConfigErrorKind::TotalQtyBoundsInverted { min, max });
        }

        let reachable = group.max_reachable_qty();

        if reachable < u64::from(min) {
            kinds.push(ConfigErrorKind::UnreachableMinTotalQty { min, reachable });
        }
    }

    kinds
        .into_iter()
        .map(|kind| GroupConfigError {
            group_id: group.id.clone(),
            label: group.label.clone(),
            kind,
        })
        .collect()
}

/// True when the group has no configuration errors.
pub fn is_well_configured(group: &OptionGroup<'_>) -> bool {
    group_config_errors(group).is_empty()
}

/// Validation outcome for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    /// Group id
    pub group_id: String,

    /// Counts the rules were checked against
    pub tally: Tally,

    /// Unmet rules, in rule order
    pub violations: SmallVec<[Violation; 4]>,

    /// Configuration errors
    pub config_errors: SmallVec<[GroupConfigError; 2]>,
}

impl GroupReport {
    /// True when the group has no violations and no configuration errors.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty() && self.config_errors.is_empty()
    }
}

/// Validate one group against the shopper's selection.
///
/// Every rule is checked independently, so a required group with a minimum
/// selection count reports both rules when nothing is chosen.
pub fn validate_group(group: &OptionGroup<'_>, selection: &Selection) -> GroupReport {
    let tally = selection.tally(group);
    let mut kinds: SmallVec<[ViolationKind; 4]> = SmallVec::new();

    if group.required && tally.selection_count == 0 {
        kinds.push(ViolationKind::Required);
    }

    if let Some(min) = group.min_selections
        && tally.selection_count < u64::from(min)
    {
        kinds.push(ViolationKind::TooFewSelections {
            min,
            actual: tally.selection_count,
        });
    }

    if let Some(max) = group.max_selections
        && tally.selection_count > u64::from(max)
    {
        kinds.push(ViolationKind::TooManySelections {
            max,
            actual: tally.selection_count,
        });
    }

    if let Some(min) = group.min_total_qty
        && tally.total_qty < u64::from(min)
    {
        kinds.push(ViolationKind::TooFewItems {
            min,
            actual: tally.total_qty,
        });
    }

    if let Some(max) = group.max_total_qty
        && tally.total_qty > u64::from(max)
    {
        kinds.push(ViolationKind::TooManyItems {
            max,
            actual: tally.total_qty,
        });
    }

    let config_errors = group_config_errors(group);

    for error in &config_errors {
        warn!(group_id = %error.group_id, kind = %error.kind, "option group is misconfigured");
    }

    GroupReport {
        group_id: group.id.clone(),
        tally,
        violations: kinds
            .into_iter()
            .map(|kind| Violation {
                group_id: group.id.clone(),
                label: group.label.clone(),
                kind,
            })
            .collect(),
        config_errors,
    }
}

/// Validation outcome for a whole selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    groups: Vec<GroupReport>,
}

impl ValidationReport {
    /// True iff no group has a violation or a configuration error.
    pub fn is_valid(&self) -> bool {
        self.groups.iter().all(GroupReport::is_valid)
    }

    /// Per-group reports, in the order the groups were given.
    pub fn groups(&self) -> &[GroupReport] {
        &self.groups
    }

    /// Report for one group.
    pub fn group(&self, group_id: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|report| report.group_id == group_id)
    }

    /// Every violation, grouped by group then rule order.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.groups.iter().flat_map(|report| report.violations.iter())
    }

    /// Every configuration error.
    pub fn group_config_errors(&self) -> impl Iterator<Item = &GroupConfigError> {
        self.groups.iter().flat_map(|report| report.config_errors.iter())
    }

    /// True when any group is misconfigured.
    pub fn has_config_errors(&self) -> bool {
        self.group_config_errors().next().is_some()
    }

    /// Violation messages for display.
    pub fn errors(&self) -> Vec<String> {
        self.violations().map(ToString::to_string).collect()
    }

    /// Configuration error messages for display.
    pub fn config_errors(&self) -> Vec<String> {
        self.group_config_errors().map(ToString::to_string).collect()
    }
}

/// Validate a selection against every group.
pub fn validate(groups: &[OptionGroup<'_>], selection: &Selection) -> ValidationReport {
    ValidationReport {
        groups: groups
            .iter()
            .map(|group| validate_group(group, selection))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::TWD};
    use testresult::TestResult;

    use crate::{
        catalog::{groups::SelectionMode, options::PurchaseOption},
        selection::SelectionAction,
    };

    use super::*;

    fn options(count: usize) -> Vec<PurchaseOption<'static>> {
        (0..count)
            .map(|i| {
                PurchaseOption::new(
                    format!("opt{i}"),
                    format!("Option {i}"),
                    Money::from_minor(100, TWD),
                )
            })
            .collect()
    }

    fn select(group_id: &str, quantities: &[(&str, u32)]) -> Selection {
        quantities.iter().fold(Selection::new(), |selection, (option_id, quantity)| {
            selection.reduce(SelectionAction::set_quantity(group_id, *option_id, *quantity))
        })
    }

    #[test]
    fn empty_unconstrained_group_is_valid() {
        let group = OptionGroup::new("g", "Gems", SelectionMode::Multi).with_options(options(2));

        let report = validate(&[group], &Selection::new());

        assert!(report.is_valid());
        assert!(report.errors().is_empty());
        assert!(report.config_errors().is_empty());
    }

    #[test]
    fn required_group_with_nothing_selected_is_invalid() {
        let group = OptionGroup::new("plan", "Top-up plan", SelectionMode::Single)
            .required(true)
            .with_options(options(2));

        let report = validate(&[group], &Selection::new());

        assert!(!report.is_valid());
        assert_eq!(report.errors(), vec!["Top-up plan is required".to_string()]);
    }

    #[test]
    fn required_and_min_selections_both_fire() {
        let group = OptionGroup::new("g", "Gems", SelectionMode::Multi)
            .required(true)
            .with_selections(Some(1), None)
            .with_options(options(2));

        let report = validate(&[group], &Selection::new());

        assert_eq!(
            report.errors(),
            vec![
                "Gems is required".to_string(),
                "Gems needs at least 1 option".to_string(),
            ]
        );
    }

    #[test]
    fn violations_follow_rule_order() {
        let group = OptionGroup::new("g", "Gems", SelectionMode::Multi)
            .with_selections(None, Some(1))
            .with_total_qty(None, Some(3))
            .with_options(options(2));

        let report = validate(&[group], &select("g", &[("opt0", 2), ("opt1", 2)]));

        let kinds: Vec<ViolationKind> =
            report.violations().map(|violation| violation.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ViolationKind::TooManySelections { max: 1, actual: 2 },
                ViolationKind::TooManyItems { max: 3, actual: 4 },
            ]
        );
    }

    #[test]
    fn min_total_qty_message() {
        let group = OptionGroup::new("g", "Gems", SelectionMode::Multi)
            .with_total_qty(Some(5), None)
            .with_options(options(1));

        let report = validate(&[group], &select("g", &[("opt0", 4)]));

        assert_eq!(report.errors(), vec!["Gems needs at least 5 items".to_string()]);
    }

    #[test]
    fn single_bounds_use_singular_nouns() {
        let kinds = [
            ViolationKind::TooFewSelections { min: 1, actual: 0 },
            ViolationKind::TooManySelections { max: 1, actual: 2 },
            ViolationKind::TooFewItems { min: 1, actual: 0 },
            ViolationKind::TooManyItems { max: 1, actual: 3 },
        ];

        let messages: Vec<String> = kinds.iter().map(ToString::to_string).collect();

        assert_eq!(
            messages,
            vec![
                "needs at least 1 option",
                "allows at most 1 option",
                "needs at least 1 item",
                "allows at most 1 item",
            ]
        );
    }

    #[test]
    fn concrete_multi_group_scenario() {
        let group = OptionGroup::new("g", "Bundles", SelectionMode::Multi)
            .required(true)
            .with_selections(Some(2), Some(4))
            .with_total_qty(Some(3), Some(20))
            .with_options(options(5));
        let groups = [group];

        let two = select("g", &[("opt0", 2), ("opt1", 2)]);
        let five = select(
            "g",
            &[("opt0", 1), ("opt1", 1), ("opt2", 1), ("opt3", 1), ("opt4", 1)],
        );

        assert!(validate(&groups, &two).is_valid());

        let report = validate(&groups, &five);

        assert!(!report.is_valid());
        assert_eq!(report.errors(), vec!["Bundles allows at most 4 options".to_string()]);
    }

    #[test]
    fn inverted_selection_bounds_block_every_selection() {
        let group = OptionGroup::new("g", "Gems", SelectionMode::Multi)
            .with_selections(Some(5), Some(3))
            .with_options(options(6));
        let groups = [group];

        let report = validate(
            &groups,
            &select(
                "g",
                &[("opt0", 1), ("opt1", 1), ("opt2", 1), ("opt3", 1), ("opt4", 1)],
            ),
        );

        assert!(!report.is_valid());
        assert!(report.has_config_errors());
        assert_eq!(
            report.config_errors(),
            vec![
                "Gems is misconfigured (minimum selections 5 exceed maximum 3), please contact support"
                    .to_string()
            ]
        );
    }

    #[test]
    fn inverted_total_qty_bounds_block_every_selection() {
        let group = OptionGroup::new("g", "Gems", SelectionMode::Multi)
            .with_total_qty(Some(10), Some(5))
            .with_options(options(2));

        assert_eq!(
            group_config_errors(&group)
                .iter()
                .map(|error| error.kind)
                .collect::<Vec<_>>(),
            vec![ConfigErrorKind::TotalQtyBoundsInverted { min: 10, max: 5 }]
        );

        let groups = [group];

        for total in [0, 5, 7, 10, 12] {
            let report = validate(&groups, &select("g", &[("opt0", total)]));

            assert!(!report.is_valid(), "total {total}");
            assert!(report.violations().all(|violation| violation.group_id == "g"));
        }

        assert_eq!(
            validate(&groups, &Selection::new()).config_errors(),
            vec![
                "Gems is misconfigured (minimum total quantity 10 exceeds maximum 5), please contact support"
                    .to_string()
            ]
        );
    }

    #[test]
    fn unreachable_min_total_is_a_config_error() -> TestResult {
        let group = OptionGroup::new("g", "Gems", SelectionMode::Multi)
            .with_total_qty(Some(10), Some(20))
            .with_options(
                options(2)
                    .into_iter()
                    .map(|option| option.with_bounds(0, 3, 1))
                    .collect::<Vec<_>>(),
            );

        let errors = group_config_errors(&group);
        let error = errors.first().ok_or("expected a config error")?;

        assert_eq!(
            error.kind,
            ConfigErrorKind::UnreachableMinTotalQty {
                min: 10,
                reachable: 6
            }
        );
        assert!(!is_well_configured(&group));
        assert!(!validate(&[group], &Selection::new()).is_valid());

        Ok(())
    }

    #[test]
    fn unreachable_check_needs_both_total_bounds() {
        let group = OptionGroup::new("g", "Gems", SelectionMode::Multi)
            .with_total_qty(Some(500), None)
            .with_options(options(1));

        assert!(is_well_configured(&group));
    }

    #[test]
    fn report_is_per_group() {
        let plan = OptionGroup::new("plan", "Plan", SelectionMode::Single)
            .required(true)
            .with_options(options(2));
        let extras =
            OptionGroup::new("extras", "Extras", SelectionMode::Multi).with_options(options(2));

        let report = validate(&[plan, extras], &select("extras", &[("opt0", 1)]));

        assert_eq!(report.groups().len(), 2);
        assert!(report.group("extras").is_some_and(GroupReport::is_valid));
        assert!(report.group("plan").is_some_and(|group| !group.is_valid()));
        assert_eq!(
            report.group("extras").map(|group| group.tally),
            Some(Tally {
                selection_count: 1,
                total_qty: 1
            })
        );
    }
}
