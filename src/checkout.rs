//! Checkout
//!
//! Orders are not paid in-system. A confirmed order is rendered as a text
//! message and handed to the store's LINE account through a chat link.

use std::fmt::{self, Write as _};

use rusty_money::{Money, MoneyError, iso::Currency};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError, Game},
    selection::Selection,
    settings::StorefrontSettings,
    totals::{SelectionTotals, TotalsError, format_amount, selection_totals},
    validation::validate,
};

/// Errors raised while preparing an order.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// The selection does not pass validation.
    #[error("selection is not valid: {}", .0.join("; "))]
    InvalidSelection(Vec<String>),

    /// No account or UID was given.
    #[error("account is required")]
    MissingAccount,

    /// No password was given for a game that needs one.
    #[error("password is required")]
    MissingPassword,

    /// The phone number is not `09` followed by eight digits.
    #[error("invalid phone number {0}: expected 10 digits starting with 09")]
    InvalidPhone(String),

    /// Wrapped catalog lookup error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Wrapped totals error.
    #[error(transparent)]
    Totals(#[from] TotalsError),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Writing the message failed.
    #[error("failed to render order message")]
    Format(#[from] fmt::Error),
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer
    #[default]
    Bank,

    /// Convenience-store payment code, carries a surcharge
    Convenience,

    /// LINE Pay
    LinePay,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Bank => f.write_str("Bank transfer"),
            PaymentMethod::Convenience => f.write_str("Convenience store code"),
            PaymentMethod::LinePay => f.write_str("LINE Pay"),
        }
    }
}

/// Account and contact details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetails {
    /// How the shopper signs in to the game, e.g. Google
    pub login_type: String,

    /// Account name, or the player UID for UID-only games
    pub account: String,

    /// Account password, unused for UID-only games
    pub password: String,

    /// Phone number
    pub phone: String,

    /// Payment method
    pub payment: PaymentMethod,
}

impl OrderDetails {
    /// Check the details are complete for the given game.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] for a missing account or password, or a
    /// malformed phone number.
    pub fn check(&self, game: &Game<'_>) -> Result<(), CheckoutError> {
        self.check_for(game.uid_only)
    }

    fn check_for(&self, uid_only: bool) -> Result<(), CheckoutError> {
        if self.account.trim().is_empty() {
            return Err(CheckoutError::MissingAccount);
        }

        if !uid_only && self.password.is_empty() {
            return Err(CheckoutError::MissingPassword);
        }

        if !is_valid_phone(&self.phone) {
            return Err(CheckoutError::InvalidPhone(self.phone.clone()));
        }

        Ok(())
    }
}

/// True for `09` followed by exactly eight digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.starts_with("09") && phone.bytes().all(|byte| byte.is_ascii_digit())
}

/// A validated selection for one game, ready to be confirmed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft<'a> {
    game_id: String,
    game_name: String,
    uid_only: bool,
    totals: SelectionTotals<'a>,
}

impl<'a> OrderDraft<'a> {
    /// Build a draft from a selection, refusing selections that do not validate.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidSelection`] with configuration errors
    /// first, then rule violations, or a lookup or totals error.
    pub fn from_selection(
        catalog: &Catalog<'a>,
        game_id: &str,
        selection: &Selection,
    ) -> Result<Self, CheckoutError> {
        let game = catalog.game(game_id)?;
        let groups = catalog.option_groups(game_id)?;
        let report = validate(&groups, selection);

        if !report.is_valid() {
            let mut messages = report.config_errors();
            messages.extend(report.errors());

            return Err(CheckoutError::InvalidSelection(messages));
        }

        let totals = selection_totals(&groups, selection, catalog.currency())?;

        debug!(game_id, items = totals.item_count, "order draft created");

        Ok(Self {
            game_id: game.id.clone(),
            game_name: game.name.clone(),
            uid_only: game.uid_only,
            totals,
        })
    }

    /// Game id
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Totals for the selection
    pub fn totals(&self) -> &SelectionTotals<'a> {
        &self.totals
    }

    /// Amount due for a payment method, including any surcharge.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the money arithmetic fails.
    pub fn final_price(
        &self,
        payment: PaymentMethod,
        settings: &StorefrontSettings,
    ) -> Result<Money<'a, Currency>, CheckoutError> {
        let total = self.totals.total;

        if payment != PaymentMethod::Convenience {
            return Ok(total);
        }

        Ok(total.add(Money::from_minor(settings.convenience_surcharge, total.currency()))?)
    }

    /// Render the order message.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the details are incomplete for this game.
    pub fn message(
        &self,
        details: &OrderDetails,
        settings: &StorefrontSettings,
    ) -> Result<OrderMessage, CheckoutError> {
        details.check_for(self.uid_only)?;

        let amount = self.final_price(details.payment, settings)?;
        let mut text = String::new();

        self.write_message(&mut text, details, settings, &amount)?;

        Ok(OrderMessage(text))
    }

    fn write_message(
        &self,
        out: &mut String,
        details: &OrderDetails,
        settings: &StorefrontSettings,
        amount: &Money<'a, Currency>,
    ) -> fmt::Result {
        writeln!(out, "[{} - Order]", settings.store_name)?;
        writeln!(out, "Game: {}", self.game_name)?;

        for group in &self.totals.groups {
            for line in &group.lines {
                writeln!(out, "{}: {} x{}", group.label, line.name, line.quantity)?;
            }
        }

        writeln!(out, "Amount due: {}", format_amount(amount))?;
        writeln!(out, "----------------------")?;

        if self.uid_only {
            writeln!(out, "UID: {}", details.account)?;
        } else {
            writeln!(out, "Login: {}", details.login_type)?;
            writeln!(out, "Account: {}", details.account)?;
            writeln!(out, "Password: {}", details.password)?;
        }

        writeln!(out, "Phone: {}", details.phone)?;
        write!(out, "Payment: {}", details.payment)
    }
}

/// Rendered order text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMessage(String);

impl OrderMessage {
    /// Message text
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Chat link that opens the store's LINE account with the message filled in.
    pub fn contact_url(&self, settings: &StorefrontSettings) -> String {
        format!("{}?text={}", settings.line_link, urlencoding::encode(&self.0))
    }
}

impl fmt::Display for OrderMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
