//! Option Groups

use std::fmt;

use serde::Deserialize;

use crate::catalog::options::PurchaseOption;

/// How many options of a group may carry a quantity at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// At most one option may have a non-zero quantity.
    #[default]
    Single,

    /// Any number of options may have a non-zero quantity.
    Multi,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Single => f.write_str("single"),
            SelectionMode::Multi => f.write_str("multi"),
        }
    }
}

/// A named, ordered collection of options with a selection policy.
///
/// Every bound is optional; `None` means unbounded. Selection bounds count the
/// distinct options with a non-zero quantity, total bounds sum the quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup<'a> {
    /// Group identifier
    pub id: String,

    /// Display name
    pub label: String,

    /// Sort key
    pub order: i32,

    /// At least one option must be selected
    pub required: bool,

    /// Single or multi selection
    pub selection_mode: SelectionMode,

    /// Minimum number of distinct options selected
    pub min_selections: Option<u32>,

    /// Maximum number of distinct options selected
    pub max_selections: Option<u32>,

    /// Minimum sum of quantities
    pub min_total_qty: Option<u32>,

    /// Maximum sum of quantities
    pub max_total_qty: Option<u32>,

    /// Options in display order
    pub options: Vec<PurchaseOption<'a>>,
}

impl<'a> OptionGroup<'a> {
    /// Create an unconstrained group with no options.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        selection_mode: SelectionMode,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            order: 0,
            required: false,
            selection_mode,
            min_selections: None,
            max_selections: None,
            min_total_qty: None,
            max_total_qty: None,
            options: Vec::new(),
        }
    }

    /// Set the sort key.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Mark the group as required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the distinct-selection bounds.
    #[must_use]
    pub fn with_selections(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_selections = min;
        self.max_selections = max;
        self
    }

    /// Set the total-quantity bounds.
    #[must_use]
    pub fn with_total_qty(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_total_qty = min;
        self.max_total_qty = max;
        self
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: impl Into<Vec<PurchaseOption<'a>>>) -> Self {
        self.options = options.into();
        self
    }

    /// Look up an option by id.
    pub fn option(&self, option_id: &str) -> Option<&PurchaseOption<'a>> {
        self.options.iter().find(|option| option.id == option_id)
    }

    /// Highest total quantity reachable if every option is at its maximum.
    pub fn max_reachable_qty(&self) -> u64 {
        self.options.iter().map(|option| u64::from(option.max_qty)).sum()
    }
}

/// Returns the groups sorted by their `order` key, keeping input order on ties.
pub fn sorted_groups<'g, 'a>(groups: &'g [OptionGroup<'a>]) -> Vec<&'g OptionGroup<'a>> {
    let mut sorted: Vec<&OptionGroup<'a>> = groups.iter().collect();

    sorted.sort_by_key(|group| group.order);

    sorted
}
