//! Legacy Packages
//!
//! Older catalog records describe a game as a flat list of packages. This module
//! adapts those packages into a single required, single-select option group so
//! the rest of the engine only ever sees option groups, and provides the one-way
//! migration that writes the derived group back onto the game.

use std::{fmt, io};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{builder::Builder, settings::Style};
use tracing::info;

use crate::catalog::{
    Game,
    groups::{OptionGroup, SelectionMode},
    options::PurchaseOption,
};

/// Identifier given to the group derived from legacy packages.
pub const DEFAULT_GROUP_ID: &str = "default";

/// Label given to the group derived from legacy packages when none is configured.
pub const DEFAULT_GROUP_LABEL: &str = "Select a plan";

/// A package from the legacy flat catalog format.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyPackage<'a> {
    /// Package identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Optional image URL
    pub image: Option<String>,
}

impl<'a> LegacyPackage<'a> {
    /// Create a package without an image.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
        }
    }
}

/// Convert a legacy package into an option with default quantity bounds.
pub fn package_to_option<'a>(package: &LegacyPackage<'a>) -> PurchaseOption<'a> {
    PurchaseOption {
        image: package.image.clone(),
        ..PurchaseOption::new(package.id.clone(), package.name.clone(), package.price)
    }
}

/// Build the single required, single-select group that stands in for a package list.
pub fn packages_to_default_group<'a>(
    packages: &[LegacyPackage<'a>],
    label: &str,
) -> OptionGroup<'a> {
    OptionGroup::new(DEFAULT_GROUP_ID, label, SelectionMode::Single)
        .required(true)
        .with_selections(Some(1), Some(1))
        .with_options(packages.iter().map(package_to_option).collect::<Vec<_>>())
}

/// The option groups a game exposes.
///
/// Authored groups win, even when the list is empty. Otherwise the legacy
/// packages are adapted into one default group, and a game with neither yields
/// no groups.
pub fn option_groups_for<'a>(game: &Game<'a>, label: &str) -> Vec<OptionGroup<'a>> {
    if let Some(groups) = &game.option_groups {
        return groups.clone();
    }

    if game.packages.is_empty() {
        return Vec::new();
    }

    vec![packages_to_default_group(&game.packages, label)]
}

/// Result of migrating one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    /// Packages were converted into an option group.
    Migrated,

    /// The game's option groups were already authored.
    AlreadyMigrated,

    /// The game had nothing to migrate.
    NoPackages,
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStatus::Migrated => f.write_str("migrated"),
            MigrationStatus::AlreadyMigrated => f.write_str("already migrated"),
            MigrationStatus::NoPackages => f.write_str("no packages found"),
        }
    }
}

/// Per-game migration details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Game identifier
    pub game_id: String,

    /// Game name
    pub game_name: String,

    /// Number of legacy packages on the game
    pub package_count: usize,

    /// Number of option groups after migration
    pub group_count: usize,

    /// Number of options across all groups after migration
    pub option_count: usize,

    /// What happened
    pub status: MigrationStatus,
}

/// Migrate a single game, returning the migrated copy and what happened.
pub fn migrate_game<'a>(game: &Game<'a>, label: &str) -> (Game<'a>, MigrationOutcome) {
    let status = if game.option_groups.is_some() {
        MigrationStatus::AlreadyMigrated
    } else if game.packages.is_empty() {
        MigrationStatus::NoPackages
    } else {
        MigrationStatus::Migrated
    };

    let mut migrated = game.clone();

    if status == MigrationStatus::Migrated {
        migrated.option_groups = Some(vec![packages_to_default_group(&game.packages, label)]);
    }

    let outcome = MigrationOutcome {
        game_id: game.id.clone(),
        game_name: game.name.clone(),
        package_count: game.packages.len(),
        group_count: migrated.authored_groups().len(),
        option_count: migrated
            .authored_groups()
            .iter()
            .map(|group| group.options.len())
            .sum(),
        status,
    };

    (migrated, outcome)
}

/// Summary of a catalog migration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    outcomes: Vec<MigrationOutcome>,
}

impl MigrationReport {
    /// Create a report from per-game outcomes.
    pub fn new(outcomes: Vec<MigrationOutcome>) -> Self {
        Self { outcomes }
    }

    /// Per-game outcomes in catalog order.
    pub fn outcomes(&self) -> &[MigrationOutcome] {
        &self.outcomes
    }

    /// Number of games inspected.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of games that were converted.
    pub fn successful(&self) -> usize {
        self.count(MigrationStatus::Migrated)
    }

    /// Number of games that could not be converted.
    pub fn failed(&self) -> usize {
        self.count(MigrationStatus::NoPackages)
    }

    /// Converted games as a percentage of all games, to one decimal place.
    pub fn success_rate(&self) -> Decimal {
        if self.outcomes.is_empty() {
            return Decimal::ZERO;
        }

        (Decimal::from(self.successful()) * Decimal::ONE_HUNDRED / Decimal::from(self.total()))
            .round_dp(1)
    }

    fn count(&self, status: MigrationStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }

    /// Write the report as a table followed by a one-line summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut builder = Builder::default();

        builder.push_record(["", "Game", "Packages", "Groups", "Options", "Status"]);

        for outcome in &self.outcomes {
            let mark = if outcome.status == MigrationStatus::NoPackages {
                "✗"
            } else {
                "✓"
            };

            builder.push_record([
                mark.to_string(),
                format!("{} ({})", outcome.game_name, outcome.game_id),
                outcome.package_count.to_string(),
                outcome.group_count.to_string(),
                outcome.option_count.to_string(),
                outcome.status.to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::modern_rounded());

        writeln!(out, "{table}")?;
        writeln!(
            out,
            "{} games, {} migrated, {} failed ({:.1}% success)",
            self.total(),
            self.successful(),
            self.failed(),
            self.success_rate()
        )
    }
}

/// Migrate every game, logging each conversion.
pub fn migrate_games<'a>(games: &[Game<'a>], label: &str) -> (Vec<Game<'a>>, MigrationReport) {
    let (migrated, outcomes): (Vec<_>, Vec<_>) = games
        .iter()
        .map(|game| migrate_game(game, label))
        .inspect(|(_, outcome)| {
            info!(
                game_id = %outcome.game_id,
                status = %outcome.status,
                options = outcome.option_count,
                "migrated game to option groups"
            );
        })
        .unzip();

    (migrated, MigrationReport::new(outcomes))
}

/// A discrepancy between a catalog and its migrated copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationIssue {
    /// The number of games changed.
    GameCountMismatch {
        /// Games before
        before: usize,
        /// Games after
        after: usize,
    },

    /// A game at the same position has a different id.
    GameIdMismatch {
        /// Position in the catalog
        index: usize,
        /// Id before
        before: String,
        /// Id after
        after: String,
    },

    /// A migrated game has no option groups.
    NoOptionGroups {
        /// Game id
        game_id: String,
    },

    /// The number of options differs from the number of legacy packages.
    OptionCountMismatch {
        /// Game id
        game_id: String,
        /// Legacy package count
        packages: usize,
        /// Option count after migration
        options: usize,
    },
}

impl fmt::Display for MigrationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationIssue::GameCountMismatch { before, after } => {
                write!(f, "game count mismatch: {before} -> {after}")
            }
            MigrationIssue::GameIdMismatch {
                index,
                before,
                after,
            } => write!(f, "game id mismatch at index {index}: {before} -> {after}"),
            MigrationIssue::NoOptionGroups { game_id } => {
                write!(f, "game {game_id} has no option groups after migration")
            }
            MigrationIssue::OptionCountMismatch {
                game_id,
                packages,
                options,
            } => write!(
                f,
                "game {game_id} option count mismatch: {packages} -> {options}"
            ),
        }
    }
}

/// Compare a catalog with its migrated copy.
///
/// Only games that carried legacy packages are expected to map one package to
/// one option; games that already had groups are checked for groups only.
pub fn verify_migration(
    original: &[Game<'_>],
    migrated: &[Game<'_>],
) -> SmallVec<[MigrationIssue; 4]> {
    let mut issues = SmallVec::new();

    if original.len() != migrated.len() {
        issues.push(MigrationIssue::GameCountMismatch {
            before: original.len(),
            after: migrated.len(),
        });
    }

    for (index, (before, after)) in original.iter().zip(migrated).enumerate() {
        if before.id != after.id {
            issues.push(MigrationIssue::GameIdMismatch {
                index,
                before: before.id.clone(),
                after: after.id.clone(),
            });
        }

        if !after.has_option_groups() {
            issues.push(MigrationIssue::NoOptionGroups {
                game_id: after.id.clone(),
            });

            continue;
        }

        if before.has_option_groups() {
            continue;
        }

        let options: usize = after
            .authored_groups()
            .iter()
            .map(|group| group.options.len())
            .sum();

        if options != before.packages.len() {
            issues.push(MigrationIssue::OptionCountMismatch {
                game_id: after.id.clone(),
                packages: before.packages.len(),
                options,
            });
        }
    }

    issues
}
