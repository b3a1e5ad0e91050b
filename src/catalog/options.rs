//! Purchase Options

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Default lower quantity bound for an option.
pub const DEFAULT_MIN_QTY: u32 = 0;

/// Default upper quantity bound for an option.
pub const DEFAULT_MAX_QTY: u32 = 99;

/// Default quantity step for an option.
pub const DEFAULT_STEP: u32 = 1;

/// A quantity that falls outside an option's own bounds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The quantity is lower than the option's minimum.
    #[error("quantity cannot be less than {min}")]
    BelowMinimum {
        /// Option minimum
        min: u32,
    },

    /// The quantity is higher than the option's maximum.
    #[error("quantity cannot be more than {max}")]
    AboveMaximum {
        /// Option maximum
        max: u32,
    },
}

/// A purchasable line item within an option group.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOption<'a> {
    /// Identifier, unique within its group
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Optional image URL
    pub image: Option<String>,

    /// Optional description
    pub description: Option<String>,

    /// Lowest quantity the adjuster allows
    pub min_qty: u32,

    /// Highest quantity the adjuster allows
    pub max_qty: u32,

    /// Increment used by the adjuster
    pub step: u32,
}

impl<'a> PurchaseOption<'a> {
    /// Create an option with the default quantity bounds (0, 99, step 1).
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
            description: None,
            min_qty: DEFAULT_MIN_QTY,
            max_qty: DEFAULT_MAX_QTY,
            step: DEFAULT_STEP,
        }
    }

    /// Replace the quantity bounds.
    #[must_use]
    pub fn with_bounds(mut self, min_qty: u32, max_qty: u32, step: u32) -> Self {
        self.min_qty = min_qty;
        self.max_qty = max_qty;
        self.step = step;
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check a quantity against this option's own bounds.
    ///
    /// # Errors
    ///
    /// Returns a [`QuantityError`] when the quantity is outside `min_qty..=max_qty`.
    pub fn check_quantity(&self, quantity: u32) -> Result<(), QuantityError> {
        if quantity < self.min_qty {
            return Err(QuantityError::BelowMinimum { min: self.min_qty });
        }

        if quantity > self.max_qty {
            return Err(QuantityError::AboveMaximum { max: self.max_qty });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::TWD;

    use super::*;

    fn option() -> PurchaseOption<'static> {
        PurchaseOption::new("v1", "1000 VP", Money::from_minor(280_00, TWD))
    }

    #[test]
    fn new_uses_default_bounds() {
        let option = option();

        assert_eq!(option.min_qty, 0);
        assert_eq!(option.max_qty, 99);
        assert_eq!(option.step, 1);
        assert!(option.image.is_none());
    }

    #[test]
    fn default_bounds_accept_zero_and_ninety_nine() {
        let option = option();

        assert_eq!(option.check_quantity(0), Ok(()));
        assert_eq!(option.check_quantity(99), Ok(()));
        assert_eq!(
            option.check_quantity(100),
            Err(QuantityError::AboveMaximum { max: 99 })
        );
    }

    #[test]
    fn custom_bounds_reject_quantities_outside_range() {
        let option = option().with_bounds(1, 10, 1);

        assert_eq!(option.check_quantity(5), Ok(()));
        assert_eq!(
            option.check_quantity(0),
            Err(QuantityError::BelowMinimum { min: 1 })
        );
        assert_eq!(
            option.check_quantity(11),
            Err(QuantityError::AboveMaximum { max: 10 })
        );
    }

    #[test]
    fn quantity_error_messages() {
        assert_eq!(
            QuantityError::BelowMinimum { min: 1 }.to_string(),
            "quantity cannot be less than 1"
        );
        assert_eq!(
            QuantityError::AboveMaximum { max: 10 }.to_string(),
            "quantity cannot be more than 10"
        );
    }
}
