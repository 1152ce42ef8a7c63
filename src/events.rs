//! Event surface for the entry sheet.
//!
//! Field edits, checkbox toggles, dropdown changes, page load, and form
//! submission arrive here. Each handler writes the new control state and
//! invokes the matching pipeline entry point; classification follows the
//! sheet's field-naming conventions (a sales-quantity name embeds its
//! menu number, the other-sales inputs share one bulk listener, and so
//! on).

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::form::{
    FormState, LineBinding, DISCOUNT_INPUT_FIELDS, FIELD_SERVICE_NAME, FIELD_SOLD_OUT_TOTAL,
    OTHERS_INPUT_FIELDS, PAYMENT_INPUT_FIELDS,
};
use crate::numfmt::parse_int_loose;
use crate::{lines, pipeline, report, value_str};

/// Confirmation prompt shown before sending the sheet.
pub const SEND_CONFIRM_PROMPT: &str = "販売場所はあっていますか？";

/// Submit control that triggers the confirmation sentinel.
const SUBMIT_SENTINEL_NAME: &str = "action";
const SUBMIT_SENTINEL_VALUE: &str = "send";
/// Form exempted from the submit confirmation.
const LOGOUT_FORM_ID: &str = "logout-form";

enum InputTarget {
    Line(i64),
    Others,
    Discount,
    Payment,
    Passive,
}

// ---------------------------------------------------------------------------
// Input events
// ---------------------------------------------------------------------------

/// Handle an input event on a named field: store the value, then run the
/// pipeline stage the field feeds. Passive fields (brought quantities,
/// header data) are stored without a recompute — nothing listens to
/// them until the next triggering event, as on the entry screen.
pub fn field_input(form: &FormState, name: &str, value: &str) -> Result<Value, String> {
    let target = {
        let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
        let target = if name.starts_with("sales_quantity_") {
            match doc.line_for_field(name) {
                Some(binding) => InputTarget::Line(binding.menu_no),
                None => return Err(format!("No line registered for field: {name}")),
            }
        } else if OTHERS_INPUT_FIELDS.contains(&name) {
            InputTarget::Others
        } else if DISCOUNT_INPUT_FIELDS.contains(&name) {
            InputTarget::Discount
        } else if PAYMENT_INPUT_FIELDS.contains(&name) {
            InputTarget::Payment
        } else if doc.has_field(name) {
            InputTarget::Passive
        } else {
            return Err(format!("Unknown field: {name}"));
        };
        doc.set_input_value(name, value);
        target
    };

    match target {
        InputTarget::Line(menu_no) => pipeline::recompute_line(form, menu_no),
        InputTarget::Others => pipeline::recompute_others(form),
        InputTarget::Discount => pipeline::recompute_discount(form),
        InputTarget::Payment => pipeline::recompute_revenue(form),
        InputTarget::Passive => Ok(json!({ "success": true, "field": name })),
    }
}

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// Handle a checkbox change. Sold-out boxes clamp their line's sales
/// quantity (on → brought quantity, off → 0) and recompute it; the
/// master box cascades to every line; popularity flags are stored only.
pub fn checkbox_change(form: &FormState, id: &str, checked: bool) -> Result<Value, String> {
    if id == FIELD_SOLD_OUT_TOTAL {
        return sold_out_all(form, checked);
    }

    if id.starts_with("sold_out_") {
        let menu_no = {
            let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
            let Some(binding) = doc.line_for_field(id).cloned() else {
                return Err(format!("No line registered for checkbox: {id}"));
            };
            doc.set_checkbox(&binding.sold_out, checked);
            let sales_value = clamped_sales(&doc, &binding, checked);
            doc.set_input_value(&binding.sales_quantity, &sales_value);
            binding.menu_no
        };
        return pipeline::recompute_line(form, menu_no);
    }

    if id.starts_with("popular_") || id.starts_with("unpopular_") {
        let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
        doc.set_checkbox(id, checked);
        return Ok(json!({ "success": true, "field": id }));
    }

    Err(format!("Unknown checkbox: {id}"))
}

/// Cascade the master sold-out box to every line, then recompute once.
fn sold_out_all(form: &FormState, checked: bool) -> Result<Value, String> {
    {
        let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
        doc.set_checkbox(FIELD_SOLD_OUT_TOTAL, checked);
        let bindings: Vec<LineBinding> = doc.lines().cloned().collect();
        for binding in &bindings {
            doc.set_checkbox(&binding.sold_out, checked);
            let sales_value = clamped_sales(&doc, binding, checked);
            doc.set_input_value(&binding.sales_quantity, &sales_value);
            lines::update_line(&mut doc, binding.menu_no);
        }
        info!(checked, lines = bindings.len(), "sold-out state cascaded to all lines");
    }
    pipeline::recompute_totals(form)
}

/// Handle a dropdown change; the service dropdown feeds the discount
/// stage.
pub fn select_change(form: &FormState, id: &str, index: usize) -> Result<Value, String> {
    {
        let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
        doc.select_index(id, index)?;
    }
    if id == FIELD_SERVICE_NAME {
        return pipeline::recompute_discount(form);
    }
    Ok(json!({ "success": true, "field": id }))
}

// ---------------------------------------------------------------------------
// Page load
// ---------------------------------------------------------------------------

/// Initial recomputation when the sheet is first presented.
pub fn page_load(form: &FormState) -> Result<Value, String> {
    {
        let doc = form.doc.lock().map_err(|e| e.to_string())?;
        if doc.line_count() == 0 {
            warn!("no sales-quantity lines present on the sheet");
        }
    }
    pipeline::recompute_all(form)
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// Whether submitting a form must be confirmed first. Returns the
/// prompt to show, or None when the submission may proceed unprompted.
/// The logout form is exempt; every other form prompts only when the
/// triggering control carries the send sentinel.
pub fn submit_confirmation(
    form_id: &str,
    control_name: &str,
    control_value: &str,
) -> Option<&'static str> {
    if form_id == LOGOUT_FORM_ID {
        return None;
    }
    (control_name == SUBMIT_SENTINEL_NAME && control_value == SUBMIT_SENTINEL_VALUE)
        .then_some(SEND_CONFIRM_PROMPT)
}

/// Handle a submit event. Only the send action assembles a report; any
/// other action is acknowledged and ignored.
pub fn submit(form: &FormState, payload: &Value) -> Result<Value, String> {
    let action = value_str(payload, &["action"]).ok_or("Missing action")?;
    if action != SUBMIT_SENTINEL_VALUE {
        info!(action = %action, "submit ignored, nothing to send");
        return Ok(json!({ "success": false, "action": action }));
    }

    let report = report::build_report(form)?;
    info!(report_id = %report.report_id, location = %report.location, "daily report assembled");
    Ok(json!({
        "success": true,
        "report": serde_json::to_value(&report).map_err(|e| e.to_string())?,
    }))
}

/// Apply header fields (date, person in charge, weather, felt
/// temperature, comment, food-count note) from a payload in one step.
/// Absent keys leave their fields untouched.
pub fn apply_header(form: &FormState, payload: &Value) -> Result<Value, String> {
    let mut doc = form.doc.lock().map_err(|e| e.to_string())?;
    let mappings: [(&str, &[&str]); 6] = [
        ("date", &["date"]),
        ("person_in_charge", &["personInCharge", "person_in_charge"]),
        ("weather", &["weather"]),
        ("temp", &["temp"]),
        ("comment", &["comment"]),
        ("food_count_setting", &["foodCountSetting", "food_count_setting"]),
    ];
    let mut applied = 0;
    for (field, keys) in mappings {
        if let Some(value) = value_str(payload, keys) {
            doc.set_input_value(field, &value);
            applied += 1;
        }
    }
    Ok(json!({ "success": true, "applied": applied }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The sales-quantity value a sold-out toggle forces: the brought
/// quantity when checked, zero when the user gets the field back.
fn clamped_sales(doc: &crate::form::FormDoc, binding: &LineBinding, checked: bool) -> String {
    if checked {
        parse_int_loose(&doc.input_value(&binding.quantity)).to_string()
    } else {
        "0".to_string()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
