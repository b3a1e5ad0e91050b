//! Selection
//!
//! The shopper's in-progress quantities, keyed by group id then option id.
//! State only changes through [`Selection::reduce`], which takes the current
//! state and an action and returns the next state.

use rustc_hash::FxHashMap;

use crate::catalog::groups::{OptionGroup, SelectionMode};

/// Quantities chosen within a single option group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSelection {
    quantities: FxHashMap<String, u32>,
}

/// Distinct selections and summed quantity for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Options with a quantity above zero
    pub selection_count: u64,

    /// Sum of those quantities
    pub total_qty: u64,
}

impl GroupSelection {
    /// Quantity stored for an option, zero when absent.
    pub fn quantity(&self, option_id: &str) -> u32 {
        self.quantities.get(option_id).copied().unwrap_or(0)
    }

    /// Options with a quantity above zero, in no particular order.
    pub fn selected(&self) -> impl Iterator<Item = (&str, u32)> {
        self.quantities
            .iter()
            .filter(|(_, quantity)| **quantity > 0)
            .map(|(option_id, quantity)| (option_id.as_str(), *quantity))
    }

    /// True when no option has a quantity above zero.
    pub fn is_empty(&self) -> bool {
        self.selected().next().is_none()
    }

    /// Count the selected options that belong to `group`.
    ///
    /// Quantities stored against ids the group does not define are ignored.
    pub fn tally(&self, group: &OptionGroup<'_>) -> Tally {
        group
            .options
            .iter()
            .map(|option| self.quantity(&option.id))
            .filter(|quantity| *quantity > 0)
            .fold(Tally::default(), |tally, quantity| Tally {
                selection_count: tally.selection_count.saturating_add(1),
                total_qty: tally.total_qty.saturating_add(u64::from(quantity)),
            })
    }
}

/// A transition applied to a [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// Replace the stored quantity for one option. No clamping is applied.
    SetQuantity {
        /// Group id
        group_id: String,
        /// Option id
        option_id: String,
        /// New quantity
        quantity: u32,
    },

    /// Clear every group.
    Reset,
}

impl SelectionAction {
    /// Build a [`SelectionAction::SetQuantity`].
    pub fn set_quantity(
        group_id: impl Into<String>,
        option_id: impl Into<String>,
        quantity: u32,
    ) -> Self {
        SelectionAction::SetQuantity {
            group_id: group_id.into(),
            option_id: option_id.into(),
            quantity,
        }
    }
}

/// Quantities for every group in a checkout flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    groups: FxHashMap<String, GroupSelection>,
}

impl Selection {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action and return the next state.
    #[must_use]
    pub fn reduce(mut self, action: SelectionAction) -> Self {
        match action {
            SelectionAction::SetQuantity {
                group_id,
                option_id,
                quantity,
            } => {
                self.groups
                    .entry(group_id)
                    .or_default()
                    .quantities
                    .insert(option_id, quantity);

                self
            }
            SelectionAction::Reset => Self::default(),
        }
    }

    /// Set an option's quantity, keeping a single-select group exclusive.
    ///
    /// A nonzero quantity in a [`SelectionMode::Single`] group first zeroes every
    /// other option in that group, so at most one option is ever selected.
    #[must_use]
    pub fn change_quantity(self, group: &OptionGroup<'_>, option_id: &str, quantity: u32) -> Self {
        let others: Vec<String> = if group.selection_mode == SelectionMode::Single && quantity > 0 {
            self.group(&group.id)
                .map(|current| {
                    current
                        .selected()
                        .filter(|(id, _)| *id != option_id)
                        .map(|(id, _)| id.to_string())
                        .collect()
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        others
            .into_iter()
            .fold(self, |selection, other| {
                selection.reduce(SelectionAction::set_quantity(group.id.as_str(), other, 0))
            })
            .reduce(SelectionAction::set_quantity(group.id.as_str(), option_id, quantity))
    }

    /// Quantities for one group, if anything was ever set in it.
    pub fn group(&self, group_id: &str) -> Option<&GroupSelection> {
        self.groups.get(group_id)
    }

    /// Quantity for one option, zero when absent.
    pub fn quantity(&self, group_id: &str, option_id: &str) -> u32 {
        self.group(group_id)
            .map_or(0, |group| group.quantity(option_id))
    }

    /// Tally a group against this selection.
    pub fn tally(&self, group: &OptionGroup<'_>) -> Tally {
        self.group(&group.id)
            .map(|selection| selection.tally(group))
            .unwrap_or_default()
    }

    /// True when no group has a selected option.
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(GroupSelection::is_empty)
    }
}
