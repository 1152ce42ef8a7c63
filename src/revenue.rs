//! Revenue reconciliation: sheet sales + other sales + discount against
//! the entered payment amounts.
//!
//! Every figure is re-read from its formatted field and parsed
//! defensively (decoration stripped, sign markers honoured, failures
//! counting as zero), so the reconciler works from exactly what the
//! sheet shows.

use tracing::debug;

use crate::form::{
    FormDoc, FIELD_SALES_DIFFERENCE, FIELD_TOTAL_DISCOUNT, FIELD_TOTAL_OTHERS_SALES,
    FIELD_TOTAL_REVENUE, FIELD_TOTAL_SALES,
};
use crate::numfmt::{
    format_difference, format_thousands, parse_float_loose, parse_signed_amount, round_half_up,
    strip_to_number,
};

/// The reconciliation figures of one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueFigures {
    pub total_revenue: f64,
    pub total_payment: f64,
    /// Payment total minus computed revenue; negative means the drawer
    /// came up short.
    pub difference: f64,
}

/// Recompute total revenue and the payment difference, writing both
/// formatted fields.
pub(crate) fn update_revenue(doc: &mut FormDoc) -> RevenueFigures {
    let total_sales = strip_to_number(&doc.output_text(FIELD_TOTAL_SALES));
    let discount = parse_signed_amount(&doc.input_value(FIELD_TOTAL_DISCOUNT)) as f64;
    let others_total = strip_to_number(&doc.input_value(FIELD_TOTAL_OTHERS_SALES));

    let paypay = parse_float_loose(&doc.input_value("paypay"));
    let digital_payment = parse_float_loose(&doc.input_value("digital_payment"));
    let cash = parse_float_loose(&doc.input_value("cash"));

    let total_revenue = total_sales + others_total + discount;
    let total_payment = paypay + digital_payment + cash;
    let difference = total_payment - total_revenue;

    debug!(
        total_sales,
        others_total, discount, total_revenue, total_payment, difference, "revenue reconciled"
    );

    doc.set_input_value(
        FIELD_TOTAL_REVENUE,
        &format_thousands(round_half_up(total_revenue)),
    );
    doc.set_input_value(
        FIELD_SALES_DIFFERENCE,
        &format_difference(round_half_up(difference)),
    );

    RevenueFigures {
        total_revenue,
        total_payment,
        difference,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FieldControl, PAYMENT_INPUT_FIELDS};

    fn test_doc(total_sales_text: &str, discount: &str, others: &str) -> FormDoc {
        let mut doc = FormDoc::new();
        doc.insert_field(
            FIELD_TOTAL_SALES,
            FieldControl::Output {
                value: String::new(),
                text: total_sales_text.into(),
            },
        );
        doc.insert_field(
            FIELD_TOTAL_DISCOUNT,
            FieldControl::Input {
                value: discount.into(),
            },
        );
        doc.insert_field(
            FIELD_TOTAL_OTHERS_SALES,
            FieldControl::Input {
                value: others.into(),
            },
        );
        for key in PAYMENT_INPUT_FIELDS {
            doc.insert_field(
                key,
                FieldControl::Input {
                    value: String::new(),
                },
            );
        }
        doc.insert_field(
            FIELD_TOTAL_REVENUE,
            FieldControl::Input {
                value: String::new(),
            },
        );
        doc.insert_field(
            FIELD_SALES_DIFFERENCE,
            FieldControl::Input {
                value: String::new(),
            },
        );
        doc
    }

    #[test]
    fn test_shortfall_reconciliation() {
        let mut doc = test_doc("1,000", "▲100", "0");
        doc.set_input_value("cash", "850");
        let figures = update_revenue(&mut doc);
        assert_eq!(figures.total_revenue, 900.0);
        assert_eq!(figures.difference, -50.0);
        assert_eq!(doc.input_value(FIELD_TOTAL_REVENUE), "900");
        assert_eq!(doc.input_value(FIELD_SALES_DIFFERENCE), "▲50");
    }

    #[test]
    fn test_exact_match_shows_plus_minus_zero() {
        let mut doc = test_doc("12,000", "＋0", "500");
        doc.set_input_value("paypay", "2500");
        doc.set_input_value("digital_payment", "3000");
        doc.set_input_value("cash", "7000");
        let figures = update_revenue(&mut doc);
        assert_eq!(figures.difference, 0.0);
        assert_eq!(doc.input_value(FIELD_TOTAL_REVENUE), "12,500");
        assert_eq!(doc.input_value(FIELD_SALES_DIFFERENCE), "±0");
    }

    #[test]
    fn test_surplus_uses_ascii_plus() {
        let mut doc = test_doc("1,000", "＋200", "0");
        doc.set_input_value("cash", "1500");
        update_revenue(&mut doc);
        assert_eq!(doc.input_value(FIELD_SALES_DIFFERENCE), "+300");
    }

    #[test]
    fn test_unparsable_payments_count_as_zero() {
        let mut doc = test_doc("1,000", "＋0", "0");
        doc.set_input_value("cash", "だいたい千円");
        let figures = update_revenue(&mut doc);
        assert_eq!(figures.total_payment, 0.0);
        assert_eq!(doc.input_value(FIELD_SALES_DIFFERENCE), "▲1,000");
    }

    #[test]
    fn test_discount_marker_reinterprets_sign() {
        // ▲ flips to negative, ＋ stays positive
        let mut doc = test_doc("5,000", "＋300", "0");
        let figures = update_revenue(&mut doc);
        assert_eq!(figures.total_revenue, 5300.0);

        let mut doc = test_doc("5,000", "▲300", "0");
        let figures = update_revenue(&mut doc);
        assert_eq!(figures.total_revenue, 4700.0);
    }
}
