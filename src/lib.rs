//! LunchNet POS - daily sales sheet engine.
//!
//! Implements the calculation semantics of the daily sales entry sheet:
//! per-line remaining/sales derivation, sheet-wide aggregation, discount
//! and service-fee adjustments, and revenue/payment reconciliation. The
//! live sheet is held as an in-memory form document ([`form::FormDoc`]);
//! frontends bind their controls to its field keys and forward input,
//! change, and submit events through [`events`], which drives the
//! explicit recomputation pipeline ([`pipeline`]):
//! line → totals → discount → revenue.
//!
//! Everything is recomputed from the current field values on each event;
//! no derived state is cached between passes.

pub mod diagnostics;
pub mod discount;
pub mod events;
pub mod form;
pub mod lines;
pub mod menu;
pub mod numfmt;
pub mod others;
pub mod pipeline;
pub mod report;
pub mod revenue;
pub mod totals;

pub use form::{FormDoc, FormState};
pub use menu::{build_daily_sheet, sheet_from_payload, Product, SalesLocation, SheetError, SheetItem};
pub use report::{build_report, DailyReport, ReportEntry};

pub(crate) fn value_str(v: &serde_json::Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = v.get(*key).and_then(|x| x.as_str()) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

pub(crate) fn value_f64(v: &serde_json::Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(n) = v.get(*key).and_then(|x| x.as_f64()) {
            return Some(n);
        }
    }
    None
}

pub(crate) fn value_i64(v: &serde_json::Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(n) = v.get(*key).and_then(|x| x.as_i64()) {
            return Some(n);
        }
    }
    None
}

// ===========================================================================
// Tests
// ===========================================================================
