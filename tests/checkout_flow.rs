//! End-to-end checkout against the bundled storefront fixture set.

use rusty_money::{Money, iso::TWD};
use testresult::TestResult;

use topup::{
    cart::Cart,
    catalog::{
        GameCategory,
        groups::{OptionGroup, SelectionMode},
        legacy::verify_migration,
        options::PurchaseOption,
    },
    checkout::{CheckoutError, OrderDetails, OrderDraft, PaymentMethod},
    fixtures::Fixture,
    policy::{Availability, DisabledReason, availability},
    selection::{Selection, SelectionAction},
    stepper::{Step, step_option},
    totals::selection_totals,
    validation::validate,
};

fn details() -> OrderDetails {
    OrderDetails {
        login_type: "Google".to_string(),
        account: "player@example.com".to_string(),
        password: "secret".to_string(),
        phone: "0912345678".to_string(),
        payment: PaymentMethod::Convenience,
    }
}

#[test]
fn legacy_game_checkout() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let catalog = fixture.catalog()?;
    let settings = fixture.settings();

    let groups = catalog.option_groups("1")?;
    let plan = groups.first().ok_or("legacy game should expose a default group")?;

    assert_eq!(plan.id, "default");
    assert_eq!(plan.selection_mode, SelectionMode::Single);

    let selection = step_option(Selection::new(), plan, "v1", Step::Up);
    let selection = step_option(selection, plan, "v2", Step::Up);

    assert_eq!(selection.quantity("default", "v1"), 1);
    assert_eq!(selection.quantity("default", "v2"), 0);
    assert_eq!(
        availability(plan, &selection, "v2"),
        Availability::Disabled(DisabledReason::ExclusiveSelection)
    );

    let draft = OrderDraft::from_selection(catalog, "1", &selection)?;

    assert_eq!(
        draft.final_price(PaymentMethod::Convenience, settings)?,
        Money::from_minor(310_00, TWD)
    );

    let message = draft.message(&details(), settings)?;

    assert!(message.text().contains("1000 VP x1"));
    assert!(
        message
            .contact_url(settings)
            .starts_with("https://line.me/R/ti/p/@yh666?text=")
    );

    Ok(())
}

#[test]
fn multi_group_game_checkout_and_cart() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let catalog = fixture.catalog()?;

    let game = catalog.game("7")?;
    assert_eq!(game.category, GameCategory::Uid);
    assert!(game.uid_only);

    let groups = catalog.option_groups("7")?;
    let crystals = groups
        .iter()
        .find(|group| group.id == "crystals")
        .ok_or("crystals group")?;

    let selection = Selection::new()
        .change_quantity(crystals, "c1", 2)
        .change_quantity(crystals, "c2", 1);

    assert!(validate(&groups, &selection).is_valid());

    let totals = selection_totals(&groups, &selection, catalog.currency())?;

    assert_eq!(totals.item_count, 3);
    assert_eq!(totals.total, Money::from_minor(210_00, TWD));

    let mut cart = Cart::new(catalog.currency());
    cart.add_selection(catalog, "7", &selection)?;
    cart.add_selection(catalog, "7", &selection)?;

    assert_eq!(cart.len(), 2);
    assert_eq!(cart.item_count(), 6);
    assert_eq!(cart.total_price()?, Money::from_minor(420_00, TWD));
    assert!(cart.validate_against(catalog).is_valid());

    let uid_details = OrderDetails {
        account: "800123456".to_string(),
        password: String::new(),
        ..details()
    };

    let message = OrderDraft::from_selection(catalog, "7", &selection)?
        .message(&uid_details, fixture.settings())?;

    assert!(message.text().contains("UID: 800123456"));

    Ok(())
}

#[test]
fn invalid_selection_blocks_checkout() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let catalog = fixture.catalog()?;

    let result = OrderDraft::from_selection(catalog, "7", &Selection::new());

    assert!(matches!(
        result,
        Err(CheckoutError::InvalidSelection(messages))
            if messages.first().is_some_and(|message| message == "Genesis Crystals is required")
    ));

    Ok(())
}

#[test]
fn migrating_the_storefront_keeps_every_option() -> TestResult {
    let mut fixture = Fixture::from_set("storefront")?;
    let label = fixture.settings().default_group_label.clone();

    let original: Vec<_> = fixture.catalog()?.games().cloned().collect();
    let groups_before = fixture.catalog()?.option_groups("2")?;

    let report = fixture.catalog_mut()?.migrate(&label);
    let migrated: Vec<_> = fixture.catalog()?.games().cloned().collect();

    assert_eq!(report.total(), 5);
    assert_eq!(report.successful(), 3);
    assert_eq!(report.failed(), 0);
    assert!(verify_migration(&original, &migrated).is_empty());
    assert_eq!(fixture.catalog()?.option_groups("2")?, groups_before);

    Ok(())
}

#[test]
fn admin_edits_flow_through_validation() -> TestResult {
    let mut fixture = Fixture::from_set("storefront")?;
    let catalog = fixture.catalog_mut()?;

    catalog.add_option_group(
        "1",
        OptionGroup::new("battlepass", "Battle pass", SelectionMode::Single)
            .with_order(1)
            .required(true)
            .with_options([PurchaseOption::new(
                "bp",
                "Premium pass",
                Money::from_minor(300_00, TWD),
            )]),
    )?;

    let groups = catalog.option_groups("1")?;
    let only_plan = Selection::new().reduce(SelectionAction::set_quantity("default", "v1", 1));

    let report = validate(&groups, &only_plan);

    assert_eq!(report.errors(), vec!["Battle pass is required".to_string()]);

    catalog.remove_option_group("1", "battlepass")?;

    assert!(validate(&catalog.option_groups("1")?, &only_plan).is_valid());

    Ok(())
}

#[test]
fn required_group_alone_rejects_empty_selection() {
    let group = OptionGroup::new("plan", "Top-up plan", SelectionMode::Single)
        .required(true)
        .with_options([PurchaseOption::new("p1", "Plan", Money::from_minor(100, TWD))]);

    let report = validate(&[group], &Selection::new());

    assert!(!report.is_valid());
    assert!(report.errors().iter().any(|error| error.contains("Top-up plan")));
}

#[test]
fn totals_for_two_priced_options() -> TestResult {
    let group = OptionGroup::new("g", "Gems", SelectionMode::Multi).with_options([
        PurchaseOption::new("a", "A", Money::from_minor(100, TWD)),
        PurchaseOption::new("b", "B", Money::from_minor(200, TWD)),
    ]);

    let selection = Selection::new()
        .reduce(SelectionAction::set_quantity("g", "a", 2))
        .reduce(SelectionAction::set_quantity("g", "b", 3));

    let totals = selection_totals(&[group], &selection, TWD)?;

    assert_eq!(totals.total, Money::from_minor(800, TWD));
    assert_eq!(totals.item_count, 5);

    Ok(())
}
