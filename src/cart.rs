//! Cart
//!
//! Several purchases across games, collected before a single checkout.

use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    catalog::{Catalog, CatalogError, groups::sorted_groups},
    selection::Selection,
    validation::validate,
};

new_key_type! {
    /// Cart Item Key
    pub struct CartItemKey;
}

/// Errors related to cart contents.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// An item's currency differs from the cart currency (item currency, cart currency).
    #[error("item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The item is not in the cart.
    #[error("item not found in cart")]
    ItemNotFound(CartItemKey),

    /// A selection was added that does not pass validation.
    #[error("selection is not valid: {}", .0.join("; "))]
    InvalidSelection(Vec<String>),

    /// Wrapped catalog lookup error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Price times quantity does not fit in minor units.
    #[error("line total overflows")]
    Overflow,
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem<'a> {
    /// Game id
    pub game_id: String,

    /// Game name
    pub game_name: String,

    /// Option group id
    pub group_id: String,

    /// Option id
    pub option_id: String,

    /// Option name
    pub option_name: String,

    /// Unit price when added
    pub unit_price: Money<'a, Currency>,

    /// Quantity
    pub quantity: u32,
}

impl CartItem<'_> {
    fn same_product(&self, other: &Self) -> bool {
        self.game_id == other.game_id
            && self.group_id == other.group_id
            && self.option_id == other.option_id
    }
}

/// A cart line whose unit price differs from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange<'a> {
    /// Cart line
    pub key: CartItemKey,

    /// Price in the cart
    pub was: Money<'a, Currency>,

    /// Price in the catalog
    pub now: Money<'a, Currency>,
}

/// Result of checking a cart against the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartValidation<'a> {
    /// Lines whose game, group or option no longer exists
    pub unavailable: Vec<CartItemKey>,

    /// Lines whose price has changed
    pub price_changes: Vec<PriceChange<'a>>,
}

impl CartValidation<'_> {
    /// True when every line still matches the catalog.
    pub fn is_valid(&self) -> bool {
        self.unavailable.is_empty() && self.price_changes.is_empty()
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    items: SlotMap<CartItemKey, CartItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: SlotMap::with_key(),
            currency,
        }
    }

    /// Add a line, merging it into an existing line for the same option.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the price is in another currency.
    pub fn add_item(&mut self, item: CartItem<'a>) -> Result<CartItemKey, CartError> {
        let item_currency = item.unit_price.currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some((key, existing)) = self
            .items
            .iter_mut()
            .find(|(_, existing)| existing.same_product(&item))
        {
            existing.quantity = existing.quantity.saturating_add(item.quantity);

            debug!(option_id = %item.option_id, quantity = existing.quantity, "merged cart item");

            return Ok(key);
        }

        debug!(option_id = %item.option_id, quantity = item.quantity, "added cart item");

        Ok(self.items.insert(item))
    }

    /// Add every selected option of a valid selection for a game.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidSelection`] with the validation messages if
    /// the selection does not pass, or a lookup error if the game is unknown.
    pub fn add_selection(
        &mut self,
        catalog: &Catalog<'a>,
        game_id: &str,
        selection: &Selection,
    ) -> Result<SmallVec<[CartItemKey; 4]>, CartError> {
        let game = catalog.game(game_id)?;
        let groups = catalog.option_groups(game_id)?;
        let report = validate(&groups, selection);

        if !report.is_valid() {
            let mut messages = report.config_errors();
            messages.extend(report.errors());

            return Err(CartError::InvalidSelection(messages));
        }

        let mut keys = SmallVec::new();

        for group in sorted_groups(&groups) {
            for option in &group.options {
                let quantity = selection.quantity(&group.id, &option.id);

                if quantity == 0 {
                    continue;
                }

                keys.push(self.add_item(CartItem {
                    game_id: game.id.clone(),
                    game_name: game.name.clone(),
                    group_id: group.id.clone(),
                    option_id: option.id.clone(),
                    option_name: option.name.clone(),
                    unit_price: option.price,
                    quantity,
                })?);
            }
        }

        Ok(keys)
    }

    /// Change a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the line is not in the cart.
    pub fn update_quantity(&mut self, key: CartItemKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(key).map(|_| ());
        }

        let item = self.items.get_mut(key).ok_or(CartError::ItemNotFound(key))?;
        item.quantity = quantity;

        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the line is not in the cart.
    pub fn remove_item(&mut self, key: CartItemKey) -> Result<CartItem<'a>, CartError> {
        self.items.remove(key).ok_or(CartError::ItemNotFound(key))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Look up a line.
    pub fn get(&self, key: CartItemKey) -> Option<&CartItem<'a>> {
        self.items.get(key)
    }

    /// Iterate over the lines.
    pub fn iter(&self) -> impl Iterator<Item = (CartItemKey, &CartItem<'a>)> {
        self.items.iter()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of every line's quantity.
    pub fn item_count(&self) -> u64 {
        self.items.values().map(|item| u64::from(item.quantity)).sum()
    }

    /// Cart currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sum of unit price times quantity over every line.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line total overflows.
    pub fn total_price(&self) -> Result<Money<'a, Currency>, CartError> {
        self.items
            .values()
            .try_fold(Money::from_minor(0, self.currency), |acc, item| {
                let line = item
                    .unit_price
                    .to_minor_units()
                    .checked_mul(i64::from(item.quantity))
                    .ok_or(CartError::Overflow)?;

                Ok(acc.add(Money::from_minor(line, self.currency))?)
            })
    }

    /// Check every line against the current catalog.
    pub fn validate_against(&self, catalog: &Catalog<'a>) -> CartValidation<'a> {
        let mut validation = CartValidation::default();

        for (key, item) in &self.items {
            let option = catalog.option_groups(&item.game_id).ok().and_then(|groups| {
                groups
                    .iter()
                    .find(|group| group.id == item.group_id)
                    .and_then(|group| group.option(&item.option_id))
                    .map(|option| option.price)
            });

            match option {
                None => {
                    warn!(
                        game_id = %item.game_id,
                        option_id = %item.option_id,
                        "cart item no longer available"
                    );

                    validation.unavailable.push(key);
                }
                Some(price) if price != item.unit_price => {
                    warn!(
                        game_id = %item.game_id,
                        option_id = %item.option_id,
                        was = item.unit_price.to_minor_units(),
                        now = price.to_minor_units(),
                        "cart item price changed"
                    );

                    validation.price_changes.push(PriceChange {
                        key,
                        was: item.unit_price,
                        now: price,
                    });
                }
                Some(_) => {}
            }
        }

        validation
    }
}
