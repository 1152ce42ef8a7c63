//! Sheet-wide aggregation over the menu lines.
//!
//! Every pass re-derives each line from its current quantity, price, and
//! sales value — the per-line output pairs are display artifacts, never
//! an input. One designated line is exempt from the quantity aggregates
//! but still contributes to the sales total.

use tracing::debug;

use crate::form::{
    FormDoc, FIELD_TOTAL_QUANTITY, FIELD_TOTAL_REMAINING, FIELD_TOTAL_SALES,
    FIELD_TOTAL_SALES_QUANTITY,
};
use crate::lines::{derive_line, LineFigures};

/// The four sheet aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetTotals {
    pub total_quantity: i64,
    pub total_sales_quantity: i64,
    pub total_remaining: i64,
    pub total_sales: i64,
}

/// Aggregate every registered line and write all four output pairs.
pub(crate) fn calculate_totals(doc: &mut FormDoc) -> SheetTotals {
    let figures: Vec<LineFigures> = doc
        .lines()
        .map(|binding| derive_line(doc, binding))
        .collect();

    let mut totals = SheetTotals::default();
    for line in figures {
        // The sales total counts every line, the exempt one included
        totals.total_sales += line.line_total;
        if Some(line.menu_no) == doc.aggregate_exempt_menu_no {
            continue;
        }
        totals.total_quantity += line.quantity;
        totals.total_sales_quantity += line.sales_quantity;
        totals.total_remaining += line.remaining;
    }

    debug!(
        total_quantity = totals.total_quantity,
        total_sales_quantity = totals.total_sales_quantity,
        total_remaining = totals.total_remaining,
        total_sales = totals.total_sales,
        "totals recomputed"
    );

    doc.set_output(FIELD_TOTAL_QUANTITY, totals.total_quantity);
    doc.set_output(FIELD_TOTAL_SALES_QUANTITY, totals.total_sales_quantity);
    doc.set_output(FIELD_TOTAL_REMAINING, totals.total_remaining);
    doc.set_output(FIELD_TOTAL_SALES, totals.total_sales);
    totals
}

/// Remaining stock as a share of brought stock, in percent. Zero
/// brought stock reads as 0.0.
pub fn waste_rate(total_remaining: i64, total_quantity: i64) -> f64 {
    if total_quantity <= 0 {
        return 0.0;
    }
    total_remaining as f64 / total_quantity as f64 * 100.0
}

// ===========================================================================
// Tests
// ===========================================================================
