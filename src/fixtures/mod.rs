//! Fixtures
//!
//! Loads catalogs and settings from YAML under a base directory, laid out as
//! `catalog/{name}.yml` and `settings/{name}.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError, Game},
    fixtures::catalog::CatalogFixture,
    settings::{SettingsError, StorefrontSettings},
};

pub mod catalog;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Negative price
    #[error("Price cannot be negative: {0}")]
    NegativePrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between games
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No priced games in the fixture
    #[error("No prices in fixture; currency unknown")]
    NoCurrency,

    /// No catalog loaded yet
    #[error("No catalog loaded")]
    NoCatalog,

    /// Catalog construction error
    #[error("Failed to build catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Settings loading error
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Loaded catalog
    catalog: Option<Catalog<'a>>,

    /// Loaded or default settings
    settings: StorefrontSettings,
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            settings: StorefrontSettings::default(),
        }
    }

    /// Load settings from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_settings(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("settings").join(format!("{name}.yml"));

        self.settings = StorefrontSettings::from_file(&file_path)?;

        Ok(self)
    }

    /// Load a catalog from a YAML fixture file
    ///
    /// Every price must share one currency. Legacy groups are labelled with the
    /// currently loaded settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a price is invalid,
    /// currencies are mixed, or a game id repeats.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        let games = fixture
            .games
            .into_iter()
            .map(Game::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let currency = catalog_currency(&games)?;
        let mut catalog =
            Catalog::new(currency).with_default_group_label(&self.settings.default_group_label);

        for game in games {
            catalog.insert(game)?;
        }

        debug!(
            name,
            games = catalog.len(),
            currency = currency.iso_alpha_code,
            "loaded catalog fixture"
        );

        self.catalog = Some(catalog);

        Ok(self)
    }

    /// Load a fixture set: settings (if `settings/{name}.yml` exists) then the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if any file fails to load.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a fixture set from a custom base path.
    ///
    /// # Errors
    ///
    /// Returns an error if any file fails to load.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        if fixture.base_path.join("settings").join(format!("{name}.yml")).exists() {
            fixture.load_settings(name)?;
        }

        fixture.load_catalog(name)?;

        Ok(fixture)
    }

    /// Loaded catalog
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog has been loaded.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCatalog)
    }

    /// Mutable access to the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog has been loaded.
    pub fn catalog_mut(&mut self) -> Result<&mut Catalog<'a>, FixtureError> {
        self.catalog.as_mut().ok_or(FixtureError::NoCatalog)
    }

    /// Loaded settings, or the defaults
    pub fn settings(&self) -> &StorefrontSettings {
        &self.settings
    }
}

fn catalog_currency(games: &[Game<'_>]) -> Result<&'static Currency, FixtureError> {
    let mut codes = games.iter().flat_map(|game| {
        game.packages
            .iter()
            .map(|package| package.price.currency().iso_alpha_code)
            .chain(game.authored_groups().iter().flat_map(|group| {
                group
                    .options
                    .iter()
                    .map(|option| option.price.currency().iso_alpha_code)
            }))
    });

    let first = codes.next().ok_or(FixtureError::NoCurrency)?;

    if let Some(other) = codes.find(|code| *code != first) {
        return Err(FixtureError::CurrencyMismatch(first.to_string(), other.to_string()));
    }

    rusty_money::iso::find(first).ok_or_else(|| FixtureError::UnknownCurrency(first.to_string()))
}
