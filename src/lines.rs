//! Per-line calculator for the menu list.
//!
//! Derives remaining stock and the line sales total from the line's
//! current quantity, unit price, and sales value, applying the sold-out
//! clamp, and writes both output pairs (raw value + formatted display).

use tracing::{debug, warn};

use crate::form::{FormDoc, LineBinding};
use crate::numfmt::{parse_int_loose, round_half_up};

/// Figures derived from a line's current field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFigures {
    pub menu_no: i64,
    pub quantity: i64,
    pub sales_quantity: i64,
    /// Unit price rounded to the nearest integer before multiplying.
    pub unit_price: i64,
    pub remaining: i64,
    pub line_total: i64,
}

/// Derive a line's figures from the document. The line's stored outputs
/// are never consulted: quantity, price, and the current sales value
/// are the source of truth.
pub(crate) fn derive_line(doc: &FormDoc, binding: &LineBinding) -> LineFigures {
    let quantity = parse_int_loose(&doc.input_value(&binding.quantity));
    let sales_quantity = parse_int_loose(&doc.input_value(&binding.sales_quantity));
    let unit_price = round_half_up(binding.unit_price);
    LineFigures {
        menu_no: binding.menu_no,
        quantity,
        sales_quantity,
        unit_price,
        remaining: quantity - sales_quantity,
        line_total: sales_quantity * unit_price,
    }
}

/// Recompute one line's remaining stock and sales total.
///
/// A checked sold-out box forces the sales quantity to the brought
/// quantity before deriving — a one-way clamp that discards whatever the
/// user typed, not a validation error.
pub(crate) fn update_line(doc: &mut FormDoc, menu_no: i64) {
    let binding = match doc.line(menu_no) {
        Some(binding) => binding.clone(),
        None => {
            warn!(menu_no, "no line registered, update skipped");
            return;
        }
    };

    if doc.checkbox(&binding.sold_out) {
        let quantity = parse_int_loose(&doc.input_value(&binding.quantity));
        doc.set_input_value(&binding.sales_quantity, &quantity.to_string());
    }

    let figures = derive_line(doc, &binding);
    debug!(
        menu_no,
        quantity = figures.quantity,
        sales_quantity = figures.sales_quantity,
        remaining = figures.remaining,
        line_total = figures.line_total,
        "line recomputed"
    );

    doc.set_output(&binding.remaining, figures.remaining);
    doc.set_output(&binding.total_sales, figures.line_total);
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldControl;

    fn test_doc(unit_price: f64) -> FormDoc {
        let mut doc = FormDoc::new();
        let binding = LineBinding::new(4, "しゃけ弁当", unit_price);
        doc.insert_field(
            &binding.quantity,
            FieldControl::Input {
                value: "25".into(),
            },
        );
        doc.insert_field(
            &binding.sales_quantity,
            FieldControl::Input { value: "0".into() },
        );
        doc.insert_field(&binding.sold_out, FieldControl::Checkbox { checked: false });
        doc.insert_field(
            &binding.remaining,
            FieldControl::Output {
                value: "25".into(),
                text: "25".into(),
            },
        );
        doc.insert_field(
            &binding.total_sales,
            FieldControl::Output {
                value: "0".into(),
                text: "0".into(),
            },
        );
        assert!(doc.register_line(binding));
        doc
    }

    #[test]
    fn test_update_line_derives_remaining_and_total() {
        let mut doc = test_doc(600.0);
        doc.set_input_value("sales_quantity_4", "10");
        update_line(&mut doc, 4);
        assert_eq!(doc.output_value("remaining_4"), "15");
        assert_eq!(doc.output_value("total_sales_4"), "6000");
        assert_eq!(doc.output_text("total_sales_4"), "6,000");
    }

    #[test]
    fn test_unit_price_rounds_before_multiplying() {
        let mut doc = test_doc(550.4);
        doc.set_input_value("sales_quantity_4", "3");
        update_line(&mut doc, 4);
        // 550.4 rounds to 550, so 3 x 550, not round(3 x 550.4)
        assert_eq!(doc.output_value("total_sales_4"), "1650");

        let mut doc = test_doc(550.5);
        doc.set_input_value("sales_quantity_4", "3");
        update_line(&mut doc, 4);
        assert_eq!(doc.output_value("total_sales_4"), "1653");
    }

    #[test]
    fn test_sold_out_clamp_overrides_input() {
        let mut doc = test_doc(600.0);
        doc.set_checkbox("sold_out_4", true);
        doc.set_input_value("sales_quantity_4", "3");
        update_line(&mut doc, 4);
        // The typed 3 is discarded in favour of the brought quantity
        assert_eq!(doc.input_value("sales_quantity_4"), "25");
        assert_eq!(doc.output_value("remaining_4"), "0");
        assert_eq!(doc.output_value("total_sales_4"), "15000");
    }

    #[test]
    fn test_unparsable_sales_counts_as_zero() {
        let mut doc = test_doc(600.0);
        doc.set_input_value("sales_quantity_4", "abc");
        update_line(&mut doc, 4);
        assert_eq!(doc.output_value("remaining_4"), "25");
        assert_eq!(doc.output_value("total_sales_4"), "0");
    }

    #[test]
    fn test_unregistered_line_is_skipped() {
        let mut doc = test_doc(600.0);
        update_line(&mut doc, 99); // logs and returns
        assert_eq!(doc.output_value("remaining_4"), "25");
    }
}
