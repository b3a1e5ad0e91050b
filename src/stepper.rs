//! Quantity Stepper
//!
//! The increment/decrement control shown next to each option.

use crate::{
    catalog::{groups::OptionGroup, options::PurchaseOption},
    policy::{Availability, availability},
    selection::Selection,
};

/// Direction of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Add one step
    Up,

    /// Remove one step
    Down,
}

/// An option's current quantity with its bounds and availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityStepper {
    value: u32,
    min: u32,
    max: u32,
    step: u32,
    disabled: bool,
}

impl QuantityStepper {
    /// Create a stepper with explicit bounds.
    pub fn new(value: u32, min: u32, max: u32, step: u32) -> Self {
        Self {
            value,
            min,
            max,
            step,
            disabled: false,
        }
    }

    /// Stepper for an option, using its bounds and the current selection.
    pub fn for_option(
        group: &OptionGroup<'_>,
        option: &PurchaseOption<'_>,
        selection: &Selection,
    ) -> Self {
        Self::new(
            selection.quantity(&group.id, &option.id),
            option.min_qty,
            option.max_qty,
            option.step,
        )
        .disabled(availability(group, selection, &option.id) != Availability::Enabled)
    }

    /// Refuse increments.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Current quantity.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// True when an increment would change the value.
    pub fn can_increment(&self) -> bool {
        !self.disabled && self.value < self.max
    }

    /// True when a decrement would change the value.
    pub fn can_decrement(&self) -> bool {
        self.value > self.min
    }

    /// Value after one step up, capped at the maximum.
    pub fn increment(&self) -> u32 {
        if self.can_increment() {
            self.value.saturating_add(self.step).min(self.max)
        } else {
            self.value
        }
    }

    /// Value after one step down, floored at the minimum.
    pub fn decrement(&self) -> u32 {
        if self.can_decrement() {
            self.value.saturating_sub(self.step).max(self.min)
        } else {
            self.value
        }
    }

    /// Value after a step in either direction.
    pub fn apply(&self, step: Step) -> u32 {
        match step {
            Step::Up => self.increment(),
            Step::Down => self.decrement(),
        }
    }
}

/// Move an option by one step and return the next selection.
///
/// Unknown options leave the selection unchanged.
#[must_use]
pub fn step_option(
    selection: Selection,
    group: &OptionGroup<'_>,
    option_id: &str,
    step: Step,
) -> Selection {
    let Some(option) = group.option(option_id) else {
        return selection;
    };

    let stepper = QuantityStepper::for_option(group, option, &selection);
    let next = stepper.apply(step);

    if next == stepper.value() {
        return selection;
    }

    selection.change_quantity(group, option_id, next)
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::TWD};

    use crate::catalog::groups::SelectionMode;

    use super::*;

    #[test]
    fn increment_moves_by_step_and_caps_at_max() {
        let stepper = QuantityStepper::new(8, 0, 10, 5);

        assert!(stepper.can_increment());
        assert_eq!(stepper.increment(), 10);
        assert_eq!(QuantityStepper::new(10, 0, 10, 5).increment(), 10);
    }

    #[test]
    fn decrement_moves_by_step_and_floors_at_min() {
        let stepper = QuantityStepper::new(3, 1, 10, 5);

        assert!(stepper.can_decrement());
        assert_eq!(stepper.decrement(), 1);
        assert_eq!(QuantityStepper::new(1, 1, 10, 5).decrement(), 1);
    }

    #[test]
    fn disabled_stepper_still_decrements() {
        let stepper = QuantityStepper::new(2, 0, 10, 1).disabled(true);

        assert!(!stepper.can_increment());
        assert_eq!(stepper.increment(), 2);
        assert_eq!(stepper.decrement(), 1);
    }

    #[test]
    fn step_option_respects_policy() {
        let group = OptionGroup::new("g", "Plan", SelectionMode::Single).with_options([
            PurchaseOption::new("a", "A", Money::from_minor(100, TWD)),
            PurchaseOption::new("b", "B", Money::from_minor(200, TWD)),
        ]);

        let selection = step_option(Selection::new(), &group, "a", Step::Up);
        let blocked = step_option(selection.clone(), &group, "b", Step::Up);

        assert_eq!(selection.quantity("g", "a"), 1);
        assert_eq!(blocked, selection);

        let cleared = step_option(selection, &group, "a", Step::Down);

        assert_eq!(cleared.quantity("g", "a"), 0);
        assert_eq!(
            step_option(cleared, &group, "b", Step::Up).quantity("g", "b"),
            1
        );
    }

    #[test]
    fn step_option_ignores_unknown_options() {
        let group = OptionGroup::new("g", "Plan", SelectionMode::Multi);

        assert_eq!(
            step_option(Selection::new(), &group, "missing", Step::Up),
            Selection::new()
        );
    }
}
