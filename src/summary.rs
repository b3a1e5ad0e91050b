//! Summary
//!
//! Terminal rendering of a selection's totals.

use std::io;

use tabled::{builder::Builder, settings::Style};

use crate::totals::{SelectionTotals, format_amount};

/// Write the selected lines grouped by option group, followed by the grand totals.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_selection_summary(
    totals: &SelectionTotals<'_>,
    mut out: impl io::Write,
) -> io::Result<()> {
    if totals.is_empty() {
        return writeln!(out, "Nothing selected");
    }

    let mut builder = Builder::default();

    builder.push_record(["Group", "Option", "Unit price", "Qty", "Total"]);

    for group in &totals.groups {
        for line in &group.lines {
            builder.push_record([
                group.label.clone(),
                line.name.clone(),
                format_amount(&line.unit_price),
                line.quantity.to_string(),
                format_amount(&line.line_total),
            ]);
        }

        builder.push_record([
            String::new(),
            format!("{} subtotal", group.label),
            String::new(),
            group.item_count.to_string(),
            format_amount(&group.subtotal),
        ]);
    }

    builder.push_record([
        "Total".to_string(),
        String::new(),
        String::new(),
        totals.item_count.to_string(),
        format_amount(&totals.total),
    ]);

    let mut table = builder.build();
    table.with(Style::modern_rounded());

    writeln!(out, "{table}")
}
