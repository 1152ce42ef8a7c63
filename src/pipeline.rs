//! Explicit recomputation pipeline.
//!
//! Each entry point runs its own stage and then synchronously invokes
//! the downstream stage, so the cascade (line → totals → discount →
//! revenue) is a visible contract rather than emergent call order. A
//! stage releases the document lock before calling downstream; every
//! entry point returns the same snapshot of the derived outputs once
//! the cascade has settled.

use serde_json::{json, Value};

use crate::form::{
    FormDoc, FormState, FIELD_SALES_DIFFERENCE, FIELD_TOTAL_DISCOUNT, FIELD_TOTAL_OTHERS_SALES,
    FIELD_TOTAL_QUANTITY, FIELD_TOTAL_REMAINING, FIELD_TOTAL_REVENUE, FIELD_TOTAL_SALES,
    FIELD_TOTAL_SALES_QUANTITY,
};
use crate::numfmt::parse_int_loose;
use crate::{discount, lines, others, revenue, totals};

/// Recompute one line, then the whole downstream cascade.
pub fn recompute_line(form: &FormState, menu_no: i64) -> Result<Value, String> {
    {
        let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
        lines::update_line(&mut doc, menu_no);
    }
    recompute_totals(form)
}

/// Recompute the four aggregates, then discount and revenue.
pub fn recompute_totals(form: &FormState) -> Result<Value, String> {
    {
        let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
        totals::calculate_totals(&mut doc);
    }
    recompute_discount(form)
}

/// Recompute the discount total, then revenue. Invoking revenue here is
/// the explicit form of the discount field's change notification.
pub fn recompute_discount(form: &FormState) -> Result<Value, String> {
    {
        let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
        discount::update_discount(&mut doc);
    }
    recompute_revenue(form)
}

/// Recompute the other-sales total, then revenue.
pub fn recompute_others(form: &FormState) -> Result<Value, String> {
    {
        let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
        others::update_others(&mut doc);
    }
    recompute_revenue(form)
}

/// Recompute revenue and the payment difference; the cascade's last
/// stage.
pub fn recompute_revenue(form: &FormState) -> Result<Value, String> {
    let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
    revenue::update_revenue(&mut doc);
    Ok(snapshot(&doc))
}

/// Recompute the whole sheet in page-load order: the menu-list cascade
/// first, then the other-sales sub-form.
pub fn recompute_all(form: &FormState) -> Result<Value, String> {
    recompute_totals(form)?;
    recompute_others(form)
}

/// Current derived outputs, for view binding.
pub fn snapshot(doc: &FormDoc) -> Value {
    let total_quantity = parse_int_loose(&doc.output_value(FIELD_TOTAL_QUANTITY));
    let total_remaining = parse_int_loose(&doc.output_value(FIELD_TOTAL_REMAINING));
    json!({
        "totalQuantity": total_quantity,
        "totalSalesQuantity": parse_int_loose(&doc.output_value(FIELD_TOTAL_SALES_QUANTITY)),
        "totalRemaining": total_remaining,
        "totalSales": parse_int_loose(&doc.output_value(FIELD_TOTAL_SALES)),
        "wasteRate": format!("{:.1}%", totals::waste_rate(total_remaining, total_quantity)),
        "totalOthersSales": doc.input_value(FIELD_TOTAL_OTHERS_SALES),
        "totalDiscount": doc.input_value(FIELD_TOTAL_DISCOUNT),
        "totalRevenue": doc.input_value(FIELD_TOTAL_REVENUE),
        "salesDifference": doc.input_value(FIELD_SALES_DIFFERENCE),
    })
}

// ===========================================================================
// Tests
// ===========================================================================
