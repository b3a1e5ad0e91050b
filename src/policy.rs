//! Disablement Policy
//!
//! Decides whether an option's selector may be increased given the current
//! selection. Decreasing is always left to the option's own bounds.

use crate::{
    catalog::groups::{OptionGroup, SelectionMode},
    selection::Selection,
    validation::is_well_configured,
};

/// Why an option cannot be increased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    /// The group can never be satisfied.
    Misconfigured,

    /// Another option in a single-select group is already chosen.
    ExclusiveSelection,

    /// The group already has `max_selections` distinct options.
    SelectionLimitReached,

    /// The group already holds `max_total_qty` items.
    QuantityLimitReached,
}

/// Whether an option's selector accepts an increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Increase allowed, subject to the option's own bounds.
    Enabled,

    /// Increase refused.
    Disabled(DisabledReason),
}

impl Availability {
    /// True when the selector refuses an increase.
    pub fn is_disabled(self) -> bool {
        matches!(self, Availability::Disabled(_))
    }
}

/// Availability of one option, checking the rules in a fixed order.
pub fn availability(
    group: &OptionGroup<'_>,
    selection: &Selection,
    option_id: &str,
) -> Availability {
    if !is_well_configured(group) {
        return Availability::Disabled(DisabledReason::Misconfigured);
    }

    let current = selection.quantity(&group.id, option_id);
    let tally = selection.tally(group);

    if group.selection_mode == SelectionMode::Single && current == 0 && tally.selection_count > 0 {
        return Availability::Disabled(DisabledReason::ExclusiveSelection);
    }

    if let Some(max) = group.max_selections
        && current == 0
        && tally.selection_count >= u64::from(max)
    {
        return Availability::Disabled(DisabledReason::SelectionLimitReached);
    }

    if let Some(max) = group.max_total_qty
        && tally.total_qty >= u64::from(max)
    {
        return Availability::Disabled(DisabledReason::QuantityLimitReached);
    }

    Availability::Enabled
}

/// Availability of every option in the group, in display order.
pub fn group_availability<'g>(
    group: &'g OptionGroup<'_>,
    selection: &Selection,
) -> Vec<(&'g str, Availability)> {
    group
        .options
        .iter()
        .map(|option| (option.id.as_str(), availability(group, selection, &option.id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::TWD};

    use crate::{catalog::options::PurchaseOption, selection::SelectionAction};

    use super::*;

    fn group(mode: SelectionMode) -> OptionGroup<'static> {
        OptionGroup::new("g", "Gems", mode).with_options([
            PurchaseOption::new("a", "A", Money::from_minor(100, TWD)),
            PurchaseOption::new("b", "B", Money::from_minor(200, TWD)),
            PurchaseOption::new("c", "C", Money::from_minor(300, TWD)),
        ])
    }

    fn set(selection: Selection, option_id: &str, quantity: u32) -> Selection {
        selection.reduce(SelectionAction::set_quantity("g", option_id, quantity))
    }

    #[test]
    fn everything_enabled_on_empty_selection() {
        let group = group(SelectionMode::Single);

        assert!(
            group_availability(&group, &Selection::new())
                .iter()
                .all(|(_, availability)| *availability == Availability::Enabled)
        );
    }

    #[test]
    fn single_mode_disables_unselected_options() {
        let group = group(SelectionMode::Single);
        let selection = set(Selection::new(), "a", 1);

        assert_eq!(availability(&group, &selection, "a"), Availability::Enabled);
        assert_eq!(
            availability(&group, &selection, "b"),
            Availability::Disabled(DisabledReason::ExclusiveSelection)
        );
    }

    #[test]
    fn max_selections_blocks_new_options_only() {
        let group = group(SelectionMode::Multi).with_selections(None, Some(2));
        let selection = set(set(Selection::new(), "a", 1), "b", 1);

        assert_eq!(availability(&group, &selection, "a"), Availability::Enabled);
        assert_eq!(
            availability(&group, &selection, "c"),
            Availability::Disabled(DisabledReason::SelectionLimitReached)
        );
    }

    #[test]
    fn max_total_qty_blocks_every_option() {
        let group = group(SelectionMode::Multi).with_total_qty(None, Some(3));
        let selection = set(set(Selection::new(), "a", 2), "b", 1);

        for option_id in ["a", "b", "c"] {
            assert_eq!(
                availability(&group, &selection, option_id),
                Availability::Disabled(DisabledReason::QuantityLimitReached),
                "option {option_id}"
            );
        }
    }

    #[test]
    fn misconfigured_group_disables_unconditionally() {
        let group = group(SelectionMode::Multi).with_selections(Some(3), Some(1));

        assert!(availability(&group, &Selection::new(), "a").is_disabled());
        assert_eq!(
            availability(&group, &Selection::new(), "a"),
            Availability::Disabled(DisabledReason::Misconfigured)
        );
    }

    #[test]
    fn inverted_total_qty_bounds_disable_every_option() {
        let group = group(SelectionMode::Multi).with_total_qty(Some(10), Some(5));
        let selection = set(Selection::new(), "a", 1);

        assert!(
            group_availability(&group, &selection)
                .iter()
                .all(|(_, availability)| {
                    *availability == Availability::Disabled(DisabledReason::Misconfigured)
                })
        );
    }

    #[test]
    fn below_limits_stays_enabled() {
        let group = group(SelectionMode::Multi)
            .with_selections(None, Some(3))
            .with_total_qty(None, Some(10));
        let selection = set(Selection::new(), "a", 4);

        assert_eq!(availability(&group, &selection, "b"), Availability::Enabled);
    }
}
