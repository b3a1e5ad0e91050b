//! Checkout Example
//!
//! Builds a selection for one game, prints the validation outcome and totals,
//! and renders the LINE order link.
//!
//! Use `-f` to load a fixture set by name
//! Use `-g` to pick the game
//! Use `-s group:option=qty` (repeatable) to select options
//! Use `-p` to choose the payment method
//! Use `-m` to print a migration report for the catalog first

use std::io;

use anyhow::Result;
use clap::Parser;
use topup::{
    checkout::{OrderDetails, OrderDraft},
    fixtures::Fixture,
    selection::Selection,
    summary::write_selection_summary,
    totals::format_amount,
    utils::DemoArgs,
    validation::validate,
};
use tracing_subscriber::EnvFilter;

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("topup=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = DemoArgs::parse();

    let mut fixture = Fixture::from_set(&args.fixture)?;
    let settings = fixture.settings().clone();

    if args.migrate {
        let report = fixture.catalog_mut()?.migrate(&settings.default_group_label);

        report.write_to(io::stdout().lock())?;
        println!();
    }

    let catalog = fixture.catalog()?;
    let game = catalog.game(&args.game)?;
    let groups = catalog.option_groups(&args.game)?;

    let selection = args.picks.iter().fold(Selection::new(), |selection, pick| {
        match groups.iter().find(|group| group.id == pick.group_id) {
            Some(group) => selection.change_quantity(group, &pick.option_id, pick.quantity),
            None => selection,
        }
    });

    println!("{}", game.name);

    let report = validate(&groups, &selection);

    if !report.is_valid() {
        for error in report.config_errors() {
            println!("  ! {error}");
        }

        for error in report.errors() {
            println!("  - {error}");
        }

        return Ok(());
    }

    let draft = OrderDraft::from_selection(catalog, &args.game, &selection)?;

    write_selection_summary(draft.totals(), io::stdout().lock())?;

    let details = OrderDetails {
        login_type: "Google".to_string(),
        account: if game.uid_only {
            "800123456".to_string()
        } else {
            "player@example.com".to_string()
        },
        password: "example-password".to_string(),
        phone: "0912345678".to_string(),
        payment: args.payment.into(),
    };

    let amount = draft.final_price(details.payment, &settings)?;
    let message = draft.message(&details, &settings)?;

    println!("\nAmount due ({}): {}\n", details.payment, format_amount(&amount));
    println!("{message}\n");
    println!("{}", message.contact_url(&settings));

    Ok(())
}
