//! Catalog
//!
//! Games, their option groups, and the in-memory editing operations the back
//! office uses to author those groups.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::debug;

use crate::catalog::{
    groups::{OptionGroup, SelectionMode, sorted_groups},
    legacy::{
        DEFAULT_GROUP_LABEL, LegacyPackage, MigrationReport, migrate_games, option_groups_for,
    },
    options::PurchaseOption,
    rules::{GroupRuleError, check_group_rules},
};

pub mod groups;
pub mod legacy;
pub mod options;
pub mod rules;

new_key_type! {
    /// Game Key
    pub struct GameKey;
}

/// Errors raised while building or editing a catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// No game with the given id.
    #[error("game not found: {0}")]
    GameNotFound(String),

    /// A game with the same id already exists.
    #[error("duplicate game: {0}")]
    DuplicateGame(String),

    /// No option group with the given id on the game.
    #[error("option group {group_id} not found on game {game_id}")]
    GroupNotFound {
        /// Game id
        game_id: String,
        /// Group id
        group_id: String,
    },

    /// An option group with the same id already exists on the game.
    #[error("option group {group_id} already exists on game {game_id}")]
    DuplicateGroup {
        /// Game id
        game_id: String,
        /// Group id
        group_id: String,
    },

    /// A price uses a different currency from the catalog
    /// (game id, price currency, catalog currency).
    #[error("game {0} has a price in {1}, but the catalog uses {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// The option group breaks an authoring rule.
    #[error(transparent)]
    Rules(#[from] GroupRuleError),
}

/// Storefront section a game is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameCategory {
    /// Popular titles
    #[default]
    Hot,

    /// Top-up by player UID, no credentials needed
    Uid,

    /// Gift and point cards
    Card,
}

/// A game listed in the storefront.
#[derive(Debug, Clone, PartialEq)]
pub struct Game<'a> {
    /// Game identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Secondary (English) name
    pub english_name: Option<String>,

    /// Cover image URL
    pub image: Option<String>,

    /// Highlighted as popular
    pub hot: bool,

    /// Storefront section
    pub category: GameCategory,

    /// Only a player UID is needed to top up
    pub uid_only: bool,

    /// Legacy flat package list
    pub packages: Vec<LegacyPackage<'a>>,

    /// Authored option groups; `None` until groups are written, in which case
    /// the packages are used instead. An authored empty list stays empty.
    pub option_groups: Option<Vec<OptionGroup<'a>>>,
}

impl<'a> Game<'a> {
    /// Create a game with no packages or groups.
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: GameCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            english_name: None,
            image: None,
            hot: false,
            category,
            uid_only: category == GameCategory::Uid,
            packages: Vec::new(),
            option_groups: None,
        }
    }

    /// Replace the legacy packages.
    #[must_use]
    pub fn with_packages(mut self, packages: Vec<LegacyPackage<'a>>) -> Self {
        self.packages = packages;
        self
    }

    /// Replace the option groups.
    #[must_use]
    pub fn with_option_groups(mut self, option_groups: Vec<OptionGroup<'a>>) -> Self {
        self.option_groups = Some(option_groups);
        self
    }

    /// The authored option groups, empty when none have been written.
    pub fn authored_groups(&self) -> &[OptionGroup<'a>] {
        self.option_groups.as_deref().unwrap_or_default()
    }

    /// True when the game defines its own option groups.
    pub fn has_option_groups(&self) -> bool {
        !self.authored_groups().is_empty()
    }

    fn prices(&self) -> impl Iterator<Item = &rusty_money::Money<'a, Currency>> {
        self.packages
            .iter()
            .map(|package| &package.price)
            .chain(
                self.authored_groups()
                    .iter()
                    .flat_map(|group| group.options.iter().map(|option| &option.price)),
            )
    }
}

/// Partial update for an option group. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct OptionGroupPatch<'a> {
    /// New label
    pub label: Option<String>,

    /// New sort key
    pub order: Option<i32>,

    /// New required flag
    pub required: Option<bool>,

    /// New selection mode
    pub selection_mode: Option<SelectionMode>,

    /// New minimum selections
    pub min_selections: Option<u32>,

    /// New maximum selections
    pub max_selections: Option<u32>,

    /// New minimum total quantity
    pub min_total_qty: Option<u32>,

    /// New maximum total quantity
    pub max_total_qty: Option<u32>,

    /// Replacement options
    pub options: Option<Vec<PurchaseOption<'a>>>,
}

impl<'a> OptionGroupPatch<'a> {
    fn apply(self, group: &mut OptionGroup<'a>) {
        if let Some(label) = self.label.filter(|label| !label.is_empty()) {
            group.label = label;
        }

        if let Some(order) = self.order {
            group.order = order;
        }

        if let Some(required) = self.required {
            group.required = required;
        }

        if let Some(mode) = self.selection_mode {
            group.selection_mode = mode;
        }

        group.min_selections = self.min_selections.or(group.min_selections);
        group.max_selections = self.max_selections.or(group.max_selections);
        group.min_total_qty = self.min_total_qty.or(group.min_total_qty);
        group.max_total_qty = self.max_total_qty.or(group.max_total_qty);

        if let Some(options) = self.options {
            group.options = options;
        }
    }
}

/// All games in the storefront, priced in a single currency.
#[derive(Debug)]
pub struct Catalog<'a> {
    games: SlotMap<GameKey, Game<'a>>,
    game_keys: FxHashMap<String, GameKey>,
    currency: &'static Currency,
    default_group_label: String,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            games: SlotMap::with_key(),
            game_keys: FxHashMap::default(),
            currency,
            default_group_label: DEFAULT_GROUP_LABEL.to_string(),
        }
    }

    /// Set the label used for groups derived from legacy packages.
    #[must_use]
    pub fn with_default_group_label(mut self, label: impl Into<String>) -> Self {
        self.default_group_label = label.into();
        self
    }

    /// Add a game.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateGame`] if the id is taken, or
    /// [`CatalogError::CurrencyMismatch`] if any price is in another currency.
    pub fn insert(&mut self, game: Game<'a>) -> Result<GameKey, CatalogError> {
        if self.game_keys.contains_key(&game.id) {
            return Err(CatalogError::DuplicateGame(game.id));
        }

        self.check_currency(&game.id, game.prices())?;

        debug!(
            game_id = %game.id,
            packages = game.packages.len(),
            groups = game.authored_groups().len(),
            "added game to catalog"
        );

        let id = game.id.clone();
        let key = self.games.insert(game);

        self.game_keys.insert(id, key);

        Ok(key)
    }

    /// Look up a game by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::GameNotFound`] if there is no such game.
    pub fn game(&self, game_id: &str) -> Result<&Game<'a>, CatalogError> {
        self.game_keys
            .get(game_id)
            .and_then(|key| self.games.get(*key))
            .ok_or_else(|| CatalogError::GameNotFound(game_id.to_string()))
    }

    /// Look up a game's key by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::GameNotFound`] if there is no such game.
    pub fn game_key(&self, game_id: &str) -> Result<GameKey, CatalogError> {
        self.game_keys
            .get(game_id)
            .copied()
            .ok_or_else(|| CatalogError::GameNotFound(game_id.to_string()))
    }

    /// Iterate over the games in insertion order.
    pub fn games(&self) -> impl Iterator<Item = &Game<'a>> {
        self.games.values()
    }

    /// Games listed under a category.
    pub fn games_in(&self, category: GameCategory) -> impl Iterator<Item = &Game<'a>> {
        self.games().filter(move |game| game.category == category)
    }

    /// Number of games.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// True when the catalog has no games.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Catalog currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Label used for groups derived from legacy packages.
    pub fn default_group_label(&self) -> &str {
        &self.default_group_label
    }

    /// The option groups a shopper sees for a game, sorted by their order key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::GameNotFound`] if there is no such game.
    pub fn option_groups(&self, game_id: &str) -> Result<Vec<OptionGroup<'a>>, CatalogError> {
        let groups = option_groups_for(self.game(game_id)?, &self.default_group_label);

        Ok(sorted_groups(&groups).into_iter().cloned().collect())
    }

    /// Add an option group to a game.
    ///
    /// A game still on legacy packages has its derived group written back first,
    /// so the new group is added alongside it.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the game is missing, the group id is taken,
    /// the group breaks an authoring rule, or an option is priced in another currency.
    pub fn add_option_group(
        &mut self,
        game_id: &str,
        group: OptionGroup<'a>,
    ) -> Result<(), CatalogError> {
        check_group_rules(&group)?;
        self.check_currency(game_id, group.options.iter().map(|option| &option.price))?;

        self.edit_groups(game_id, |groups| {
            if groups.iter().any(|existing| existing.id == group.id) {
                return Err(CatalogError::DuplicateGroup {
                    game_id: game_id.to_string(),
                    group_id: group.id,
                });
            }

            debug!(game_id, group_id = %group.id, "added option group");

            groups.push(group);

            Ok(())
        })
    }

    /// Apply a partial update to one of a game's option groups, returning the
    /// updated group.
    ///
    /// The group is left untouched if the updated definition breaks a rule.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the game or group is missing, the result
    /// breaks an authoring rule, or an option is priced in another currency.
    pub fn update_option_group(
        &mut self,
        game_id: &str,
        group_id: &str,
        patch: OptionGroupPatch<'a>,
    ) -> Result<OptionGroup<'a>, CatalogError> {
        if let Some(options) = &patch.options {
            self.check_currency(game_id, options.iter().map(|option| &option.price))?;
        }

        self.edit_groups(game_id, |groups| {
            let group = groups
                .iter_mut()
                .find(|group| group.id == group_id)
                .ok_or_else(|| CatalogError::GroupNotFound {
                    game_id: game_id.to_string(),
                    group_id: group_id.to_string(),
                })?;

            patch.apply(group);
            check_group_rules(group)?;

            debug!(game_id, group_id, "updated option group");

            Ok(group.clone())
        })
    }

    /// Remove an option group from a game.
    ///
    /// Removing every group leaves the game with none; its legacy packages are
    /// not offered again.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the game or group is missing.
    pub fn remove_option_group(
        &mut self,
        game_id: &str,
        group_id: &str,
    ) -> Result<OptionGroup<'a>, CatalogError> {
        self.edit_groups(game_id, |groups| {
            let position = groups
                .iter()
                .position(|group| group.id == group_id)
                .ok_or_else(|| CatalogError::GroupNotFound {
                    game_id: game_id.to_string(),
                    group_id: group_id.to_string(),
                })?;

            debug!(game_id, group_id, "removed option group");

            Ok(groups.remove(position))
        })
    }

    /// Write derived option groups onto every game still using legacy packages.
    pub fn migrate(&mut self, label: &str) -> MigrationReport {
        let keys: Vec<GameKey> = self.games.keys().collect();
        let games: Vec<Game<'a>> = self.games.values().cloned().collect();

        let (migrated, report) = migrate_games(&games, label);

        for (key, game) in keys.into_iter().zip(migrated) {
            if let Some(slot) = self.games.get_mut(key) {
                *slot = game;
            }
        }

        report
    }

    /// Run an edit against a working copy of the game's groups, derived from
    /// its packages if none are authored yet. The copy is stored only when the
    /// edit succeeds.
    fn edit_groups<T>(
        &mut self,
        game_id: &str,
        edit: impl FnOnce(&mut Vec<OptionGroup<'a>>) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let key = self.game_key(game_id)?;

        let game = self
            .games
            .get_mut(key)
            .ok_or_else(|| CatalogError::GameNotFound(game_id.to_string()))?;

        let mut groups = option_groups_for(game, &self.default_group_label);
        let result = edit(&mut groups)?;

        game.option_groups = Some(groups);

        Ok(result)
    }

    fn check_currency<'p>(
        &self,
        game_id: &str,
        mut prices: impl Iterator<Item = &'p rusty_money::Money<'a, Currency>>,
    ) -> Result<(), CatalogError>
    where
        'a: 'p,
    {
        match prices.find(|price| price.currency() != self.currency) {
            Some(price) => Err(CatalogError::CurrencyMismatch(
                game_id.to_string(),
                price.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            )),
            None => Ok(()),
        }
    }
}
