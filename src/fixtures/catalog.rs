//! Catalog Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, TWD, USD},
};
use serde::Deserialize;

use crate::{
    catalog::{
        Game, GameCategory,
        groups::{OptionGroup, SelectionMode},
        legacy::LegacyPackage,
        options::{DEFAULT_MAX_QTY, DEFAULT_MIN_QTY, DEFAULT_STEP, PurchaseOption},
    },
    fixtures::FixtureError,
};

/// Wrapper for games in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Games in display order
    pub games: Vec<GameFixture>,
}

/// Game Fixture
#[derive(Debug, Deserialize)]
pub struct GameFixture {
    /// Game id
    pub id: String,

    /// Display name
    pub name: String,

    /// English name
    #[serde(default)]
    pub english_name: Option<String>,

    /// Cover image URL
    #[serde(default)]
    pub image: Option<String>,

    /// Highlighted as popular
    #[serde(default)]
    pub hot: bool,

    /// Storefront section
    #[serde(default)]
    pub category: GameCategory,

    /// Only a UID is needed; defaults to true for the `uid` category
    #[serde(default)]
    pub uid_only: Option<bool>,

    /// Legacy packages
    #[serde(default)]
    pub packages: Vec<PackageFixture>,

    /// Option groups
    #[serde(default)]
    pub option_groups: Vec<OptionGroupFixture>,
}

/// Legacy Package Fixture
#[derive(Debug, Deserialize)]
pub struct PackageFixture {
    /// Package id
    pub id: String,

    /// Display name
    pub name: String,

    /// Price (e.g., "280 TWD")
    pub price: String,

    /// Image URL
    #[serde(default)]
    pub image: Option<String>,
}

/// Option Group Fixture
#[derive(Debug, Deserialize)]
pub struct OptionGroupFixture {
    /// Group id
    pub id: String,

    /// Display name
    pub label: String,

    /// Sort key
    #[serde(default)]
    pub order: i32,

    /// At least one option must be selected
    #[serde(default)]
    pub required: bool,

    /// Single or multi selection
    #[serde(default)]
    pub selection_mode: SelectionMode,

    /// Minimum distinct selections
    #[serde(default)]
    pub min_selections: Option<u32>,

    /// Maximum distinct selections
    #[serde(default)]
    pub max_selections: Option<u32>,

    /// Minimum total quantity
    #[serde(default)]
    pub min_total_qty: Option<u32>,

    /// Maximum total quantity
    #[serde(default)]
    pub max_total_qty: Option<u32>,

    /// Options
    #[serde(default)]
    pub options: Vec<OptionFixture>,
}

/// Option Fixture
#[derive(Debug, Deserialize)]
pub struct OptionFixture {
    /// Option id
    pub id: String,

    /// Display name
    pub name: String,

    /// Price (e.g., "30 TWD")
    pub price: String,

    /// Image URL
    #[serde(default)]
    pub image: Option<String>,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Minimum quantity
    #[serde(default = "default_min_qty")]
    pub min_qty: u32,

    /// Maximum quantity
    #[serde(default = "default_max_qty")]
    pub max_qty: u32,

    /// Quantity step
    #[serde(default = "default_step")]
    pub step: u32,
}

fn default_min_qty() -> u32 {
    DEFAULT_MIN_QTY
}

fn default_max_qty() -> u32 {
    DEFAULT_MAX_QTY
}

fn default_step() -> u32 {
    DEFAULT_STEP
}

impl TryFrom<PackageFixture> for LegacyPackage<'_> {
    type Error = FixtureError;

    fn try_from(fixture: PackageFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(LegacyPackage {
            id: fixture.id,
            name: fixture.name,
            price: Money::from_minor(minor_units, currency),
            image: fixture.image,
        })
    }
}

impl TryFrom<OptionFixture> for PurchaseOption<'_> {
    type Error = FixtureError;

    fn try_from(fixture: OptionFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(PurchaseOption {
            id: fixture.id,
            name: fixture.name,
            price: Money::from_minor(minor_units, currency),
            image: fixture.image,
            description: fixture.description,
            min_qty: fixture.min_qty,
            max_qty: fixture.max_qty,
            step: fixture.step,
        })
    }
}

impl TryFrom<OptionGroupFixture> for OptionGroup<'_> {
    type Error = FixtureError;

    fn try_from(fixture: OptionGroupFixture) -> Result<Self, Self::Error> {
        let options = fixture
            .options
            .into_iter()
            .map(PurchaseOption::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OptionGroup {
            id: fixture.id,
            label: fixture.label,
            order: fixture.order,
            required: fixture.required,
            selection_mode: fixture.selection_mode,
            min_selections: fixture.min_selections,
            max_selections: fixture.max_selections,
            min_total_qty: fixture.min_total_qty,
            max_total_qty: fixture.max_total_qty,
            options,
        })
    }
}

impl TryFrom<GameFixture> for Game<'_> {
    type Error = FixtureError;

    fn try_from(fixture: GameFixture) -> Result<Self, Self::Error> {
        let packages = fixture
            .packages
            .into_iter()
            .map(LegacyPackage::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let option_groups = fixture
            .option_groups
            .into_iter()
            .map(OptionGroup::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut game =
            Game::new(fixture.id, fixture.name, fixture.category).with_packages(packages);

        if !option_groups.is_empty() {
            game = game.with_option_groups(option_groups);
        }

        Ok(Game {
            english_name: fixture.english_name,
            image: fixture.image,
            hot: fixture.hot,
            uid_only: fixture.uid_only.unwrap_or(game.uid_only),
            ..game
        })
    }
}

/// Parse price string (e.g., "280 TWD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a non-negative decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::NegativePrice(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "TWD" => TWD,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
