//! Option Group Authoring Rules
//!
//! Checks an admin applies before an option group is stored. These are stricter
//! than the shopper-side configuration errors reported by validation: a group
//! that passes here can still be unsatisfiable if its options cannot reach the
//! minimum total quantity.

use thiserror::Error;

use crate::catalog::groups::{OptionGroup, SelectionMode};

/// An option group definition that cannot be stored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupRuleError {
    /// The group has no label.
    #[error("option group {0} is missing a label")]
    MissingLabel(String),

    /// A single-select group allows more than one selection.
    #[error("single selection mode cannot have max selections greater than 1 (got {0})")]
    SingleModeMultipleSelections(u32),

    /// The minimum distinct selections is above the maximum.
    #[error("min selections ({min}) cannot be greater than max selections ({max})")]
    SelectionBoundsInverted {
        /// Minimum selections
        min: u32,
        /// Maximum selections
        max: u32,
    },

    /// The minimum total quantity is above the maximum.
    #[error("min total quantity ({min}) cannot be greater than max total quantity ({max})")]
    TotalQtyBoundsInverted {
        /// Minimum total quantity
        min: u32,
        /// Maximum total quantity
        max: u32,
    },

    /// An option's minimum quantity is above its maximum.
    #[error("option {option_id} has min quantity {min} greater than max quantity {max}")]
    OptionBoundsInverted {
        /// Option id
        option_id: String,
        /// Minimum quantity
        min: u32,
        /// Maximum quantity
        max: u32,
    },

    /// An option's step would never change the quantity.
    #[error("option {0} has a step of zero")]
    ZeroStep(String),
}

/// Check an option group definition, reporting the first broken rule.
///
/// # Errors
///
/// Returns the first [`GroupRuleError`] found, checking the group before its options.
pub fn check_group_rules(group: &OptionGroup<'_>) -> Result<(), GroupRuleError> {
    if group.label.trim().is_empty() {
        return Err(GroupRuleError::MissingLabel(group.id.clone()));
    }

    if group.selection_mode == SelectionMode::Single
        && let Some(max) = group.max_selections
        && max > 1
    {
        return Err(GroupRuleError::SingleModeMultipleSelections(max));
    }

    if let (Some(min), Some(max)) = (group.min_selections, group.max_selections)
        && min > max
    {
        return Err(GroupRuleError::SelectionBoundsInverted { min, max });
    }

    if let (Some(min), Some(max)) = (group.min_total_qty, group.max_total_qty)
        && min > max
    {
        return Err(GroupRuleError::TotalQtyBoundsInverted { min, max });
    }

    for option in &group.options {
        if option.min_qty > option.max_qty {
            return Err(GroupRuleError::OptionBoundsInverted {
                option_id: option.id.clone(),
                min: option.min_qty,
                max: option.max_qty,
            });
        }

        if option.step == 0 {
            return Err(GroupRuleError::ZeroStep(option.id.clone()));
        }
    }

    Ok(())
}
