//! Totals
//!
//! Item counts and prices derived from a selection. Nothing here is cached;
//! call [`selection_totals`] again after every change.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    catalog::groups::{OptionGroup, sorted_groups},
    selection::Selection,
};

/// Errors that can occur while totalling a selection.
#[derive(Debug, Error, PartialEq)]
pub enum TotalsError {
    /// Price times quantity does not fit in minor units.
    #[error("line total for option {0} overflows")]
    Overflow(String),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One selected option.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtotalLine<'a> {
    /// Option id
    pub option_id: String,

    /// Option name
    pub name: String,

    /// Unit price
    pub unit_price: Money<'a, Currency>,

    /// Quantity selected
    pub quantity: u32,

    /// Unit price times quantity
    pub line_total: Money<'a, Currency>,
}

/// Totals for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSubtotal<'a> {
    /// Group id
    pub group_id: String,

    /// Group label
    pub label: String,

    /// Selected options in display order
    pub lines: Vec<SubtotalLine<'a>>,

    /// Sum of quantities
    pub item_count: u64,

    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,
}

impl GroupSubtotal<'_> {
    /// True when nothing in the group is selected.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Totals for a whole selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionTotals<'a> {
    /// Non-empty groups in display order
    pub groups: Vec<GroupSubtotal<'a>>,

    /// Sum of every quantity
    pub item_count: u64,

    /// Sum of every subtotal
    pub total: Money<'a, Currency>,
}

impl SelectionTotals<'_> {
    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Totals for one group.
///
/// # Errors
///
/// Returns a [`TotalsError`] if a line total overflows or an option is priced
/// in a currency other than `currency`.
pub fn group_subtotal<'a>(
    group: &OptionGroup<'a>,
    selection: &Selection,
    currency: &'static Currency,
) -> Result<GroupSubtotal<'a>, TotalsError> {
    let lines = group
        .options
        .iter()
        .filter_map(|option| {
            let quantity = selection.quantity(&group.id, &option.id);

            (quantity > 0).then_some((option, quantity))
        })
        .map(|(option, quantity)| {
            let line_minor = option
                .price
                .to_minor_units()
                .checked_mul(i64::from(quantity))
                .ok_or_else(|| TotalsError::Overflow(option.id.clone()))?;

            Ok(SubtotalLine {
                option_id: option.id.clone(),
                name: option.name.clone(),
                unit_price: option.price,
                quantity,
                line_total: Money::from_minor(line_minor, option.price.currency()),
            })
        })
        .collect::<Result<Vec<_>, TotalsError>>()?;

    let subtotal = lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| acc.add(line.line_total))?;

    Ok(GroupSubtotal {
        group_id: group.id.clone(),
        label: group.label.clone(),
        item_count: lines.iter().map(|line| u64::from(line.quantity)).sum(),
        lines,
        subtotal,
    })
}

/// Totals for every group, keeping only groups with a selection.
///
/// # Errors
///
/// Returns a [`TotalsError`] if a line total overflows or prices mix currencies.
pub fn selection_totals<'a>(
    groups: &[OptionGroup<'a>],
    selection: &Selection,
    currency: &'static Currency,
) -> Result<SelectionTotals<'a>, TotalsError> {
    let groups = sorted_groups(groups)
        .into_iter()
        .map(|group| group_subtotal(group, selection, currency))
        .filter(|subtotal| !matches!(subtotal, Ok(subtotal) if subtotal.is_empty()))
        .collect::<Result<Vec<_>, TotalsError>>()?;

    let total = groups
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, group| acc.add(group.subtotal))?;

    Ok(SelectionTotals {
        item_count: groups.iter().map(|group| group.item_count).sum(),
        groups,
        total,
    })
}

/// Format an amount as `"CODE 1234.00"`.
pub fn format_amount(amount: &Money<'_, Currency>) -> String {
    format!("{} {}", amount.currency().iso_alpha_code, amount.amount())
}
