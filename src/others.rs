//! Other-sales sub-form: two freeform price × quantity entries outside
//! the menu list (drinks, side items, whatever was sold ad hoc).

use tracing::debug;

use crate::form::{FormDoc, FIELD_TOTAL_OTHERS_SALES};
use crate::numfmt::{format_thousands, parse_float_loose, parse_int_loose, round_half_up};

/// Recompute the other-sales total and write it, thousands-formatted,
/// into the total field.
pub(crate) fn update_others(doc: &mut FormDoc) -> i64 {
    let price1 = parse_float_loose(&doc.input_value("others_price1"));
    let quantity1 = parse_int_loose(&doc.input_value("others_sales_quantity1"));
    let price2 = parse_float_loose(&doc.input_value("others_price2"));
    let quantity2 = parse_int_loose(&doc.input_value("others_sales_quantity2"));

    let total = round_half_up(price1 * quantity1 as f64 + price2 * quantity2 as f64);
    debug!(price1, quantity1, price2, quantity2, total, "other sales recomputed");

    doc.set_input_value(FIELD_TOTAL_OTHERS_SALES, &format_thousands(total));
    total
}

// ===========================================================================
// Tests
// ===========================================================================
