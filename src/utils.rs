//! Utils

use clap::{Parser, ValueEnum};

use crate::checkout::PaymentMethod;

/// Payment method as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaymentArg {
    /// Bank transfer
    Bank,

    /// Convenience-store payment code
    Convenience,

    /// LINE Pay
    LinePay,
}

impl From<PaymentArg> for PaymentMethod {
    fn from(arg: PaymentArg) -> Self {
        match arg {
            PaymentArg::Bank => PaymentMethod::Bank,
            PaymentArg::Convenience => PaymentMethod::Convenience,
            PaymentArg::LinePay => PaymentMethod::LinePay,
        }
    }
}

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Fixture set to load the catalog & settings from
    #[clap(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Game id to order from
    #[clap(short, long, default_value = "1")]
    pub game: String,

    /// Selections as `group:option=qty`, applied in order
    #[clap(short = 's', long = "select", value_parser = parse_pick)]
    pub picks: Vec<Pick>,

    /// Payment method
    #[clap(short, long, value_enum, default_value = "bank")]
    pub payment: PaymentArg,

    /// Print the migration report for the catalog first
    #[clap(short, long)]
    pub migrate: bool,
}

/// One `group:option=qty` selection from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    /// Group id
    pub group_id: String,

    /// Option id
    pub option_id: String,

    /// Quantity
    pub quantity: u32,
}

/// Parse `group:option=qty`; the quantity defaults to 1 when omitted.
///
/// # Errors
///
/// Returns a message if the group or option is missing or the quantity is not a number.
pub fn parse_pick(s: &str) -> Result<Pick, String> {
    let (target, quantity) = match s.split_once('=') {
        Some((target, quantity)) => (
            target,
            quantity
                .parse::<u32>()
                .map_err(|err| format!("invalid quantity in {s}: {err}"))?,
        ),
        None => (s, 1),
    };

    let Some((group_id, option_id)) = target.split_once(':') else {
        return Err(format!("expected group:option=qty, got {s}"));
    };

    if group_id.is_empty() || option_id.is_empty() {
        return Err(format!("expected group:option=qty, got {s}"));
    }

    Ok(Pick {
        group_id: group_id.to_string(),
        option_id: option_id.to_string(),
        quantity,
    })
}
