//! Discount calculation: six counted adjustment categories plus a
//! service-fee policy gated by the sheet's service dropdown.
//!
//! The six counters each carry a fixed signed unit price. The dropdown
//! selects exactly one service rule: none at all, the flat suggest
//! deduction, or the tiered deduction priced against the selected
//! option's service price — the flat and tiered categories are mutually
//! exclusive per policy.

use tracing::{debug, warn};

use crate::form::{FormDoc, FIELD_SERVICE_NAME, FIELD_TOTAL_DISCOUNT};
use crate::menu::{SERVICE_NONE_LABEL, SERVICE_SUGGEST_LABEL};
use crate::numfmt::{format_signed_amount, parse_int_loose};

// ---------------------------------------------------------------------------
// Unit prices
// ---------------------------------------------------------------------------

pub const NO_RICE_UNIT_PRICE: i64 = -100;
pub const EXTRA_RICE_UNIT_PRICE: i64 = 100;
pub const COUPON_600_UNIT_PRICE: i64 = -600;
pub const COUPON_700_UNIT_PRICE: i64 = -700;
pub const DISCOUNT_50_UNIT_PRICE: i64 = -50;
pub const DISCOUNT_100_UNIT_PRICE: i64 = -100;
/// Flat per-unit deduction applied under the suggest policy.
pub const SERVICE_FLAT_UNIT_PRICE: i64 = -100;

// ---------------------------------------------------------------------------
// Service-fee policy
// ---------------------------------------------------------------------------

/// Which service adjustment applies, resolved from the dropdown's
/// selected label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFeePolicy {
    /// "なし" selected, or no dropdown on the sheet: no service
    /// adjustment at all.
    None,
    /// The suggest option: only the flat per-unit deduction applies.
    FlatOnly,
    /// Any other named service: only the tiered deduction applies,
    /// priced against the selected option's numeric value.
    Tiered { service_price: i64 },
}

pub(crate) fn resolve_policy(doc: &FormDoc) -> ServiceFeePolicy {
    let Some(option) = doc.selected_option(FIELD_SERVICE_NAME) else {
        warn!("service dropdown not present, skipping service adjustments");
        return ServiceFeePolicy::None;
    };
    match option.label.trim() {
        SERVICE_NONE_LABEL => ServiceFeePolicy::None,
        SERVICE_SUGGEST_LABEL => ServiceFeePolicy::FlatOnly,
        _ => ServiceFeePolicy::Tiered {
            service_price: parse_int_loose(&option.value),
        },
    }
}

// ---------------------------------------------------------------------------
// Recompute
// ---------------------------------------------------------------------------

/// Recompute the discount total and write it, sign-marked and
/// thousands-formatted, into the discount field.
pub(crate) fn update_discount(doc: &mut FormDoc) -> i64 {
    let no_rice = parse_int_loose(&doc.input_value("no_rice_quantity"));
    let extra_rice = parse_int_loose(&doc.input_value("extra_rice_quantity"));
    let coupon_600 = parse_int_loose(&doc.input_value("coupon_type_600"));
    let coupon_700 = parse_int_loose(&doc.input_value("coupon_type_700"));
    let discount_50 = parse_int_loose(&doc.input_value("discount_50"));
    let discount_100 = parse_int_loose(&doc.input_value("discount_100"));

    let mut total = no_rice * NO_RICE_UNIT_PRICE
        + extra_rice * EXTRA_RICE_UNIT_PRICE
        + coupon_600 * COUPON_600_UNIT_PRICE
        + coupon_700 * COUPON_700_UNIT_PRICE
        + discount_50 * DISCOUNT_50_UNIT_PRICE
        + discount_100 * DISCOUNT_100_UNIT_PRICE;

    let policy = resolve_policy(doc);
    let service_total = match policy {
        ServiceFeePolicy::None => 0,
        ServiceFeePolicy::FlatOnly => {
            parse_int_loose(&doc.input_value("service_type_100")) * SERVICE_FLAT_UNIT_PRICE
        }
        ServiceFeePolicy::Tiered { service_price } => {
            let tier_600 = parse_int_loose(&doc.input_value("service_type_600"));
            let tier_700 = parse_int_loose(&doc.input_value("service_type_700"));
            (COUPON_600_UNIT_PRICE + service_price) * tier_600
                + (COUPON_700_UNIT_PRICE + service_price) * tier_700
        }
    };
    total += service_total;

    debug!(total, service_total, ?policy, "discount recomputed");
    doc.set_input_value(FIELD_TOTAL_DISCOUNT, &format_signed_amount(total));
    total
}

// ===========================================================================
// Tests
// ===========================================================================
