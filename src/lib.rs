//! Topup
//!
//! Topup is the option-group selection and validation engine behind a game top-up
//! storefront: catalogs of games and option groups, a selection reducer, rule
//! validation, derived totals, a cart, and LINE order messages for checkout.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod fixtures;
pub mod policy;
pub mod prelude;
pub mod selection;
pub mod settings;
pub mod stepper;
pub mod summary;
pub mod totals;
pub mod utils;
pub mod validation;
