//! Topup prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartItem, CartItemKey, CartValidation, PriceChange},
    catalog::{
        Catalog, CatalogError, Game, GameCategory, GameKey, OptionGroupPatch,
        groups::{OptionGroup, SelectionMode, sorted_groups},
        legacy::{
            LegacyPackage, MigrationIssue, MigrationReport, MigrationStatus, migrate_game,
            option_groups_for, verify_migration,
        },
        options::{PurchaseOption, QuantityError},
        rules::{GroupRuleError, check_group_rules},
    },
    checkout::{CheckoutError, OrderDetails, OrderDraft, OrderMessage, PaymentMethod},
    fixtures::{Fixture, FixtureError},
    policy::{Availability, DisabledReason, availability},
    selection::{GroupSelection, Selection, SelectionAction, Tally},
    settings::{SettingsError, StorefrontSettings},
    stepper::{QuantityStepper, Step, step_option},
    summary::write_selection_summary,
    totals::{GroupSubtotal, SelectionTotals, TotalsError, selection_totals},
    validation::{GroupConfigError, ValidationReport, Violation, validate},
};
