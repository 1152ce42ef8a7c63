//! Menu and sales-location definitions, and daily sheet construction.
//!
//! A sheet is built once per (date, location) from the week's products
//! and the quantities brought out: one registered line per product, the
//! aggregate pairs, the other-sales sub-form, the discount counters, the
//! service dropdown (options taken from the location), and the payment
//! and header fields. The line registry is derived here and never
//! re-derived afterwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::form::{
    FieldControl, FormDoc, FormState, LineBinding, SelectOption, DISCOUNT_INPUT_FIELDS,
    FIELD_SALES_DIFFERENCE, FIELD_SERVICE_NAME, FIELD_SOLD_OUT_TOTAL, FIELD_TOTAL_DISCOUNT,
    FIELD_TOTAL_OTHERS_SALES, FIELD_TOTAL_QUANTITY, FIELD_TOTAL_REMAINING, FIELD_TOTAL_REVENUE,
    FIELD_TOTAL_SALES, FIELD_TOTAL_SALES_QUANTITY, OTHERS_INPUT_FIELDS, PAYMENT_INPUT_FIELDS,
};
use crate::numfmt::format_thousands;
use crate::{value_f64, value_i64, value_str};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// One menu product for a given week, with its three price tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub no: i64,
    /// Target week (yyyymmdd of the Monday).
    pub week: String,
    pub name: String,
    pub price_a: f64,
    pub price_b: f64,
    pub price_c: f64,
    pub container_type: String,
}

/// A selling location and the pricing/service rules attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesLocation {
    pub no: i64,
    pub name: String,
    pub location_type: String,
    /// Which price tier (A/B/C) this location sells at.
    pub price_type: String,
    pub service_name: String,
    pub service_price: i64,
    pub direct_return: i64,
}

/// A product together with the quantity brought to the location today.
#[derive(Debug, Clone)]
pub struct SheetItem {
    pub product: Product,
    pub quantity: i64,
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("duplicate menu number: {0}")]
    DuplicateMenuNo(i64),
}

/// Menu line excluded from the quantity aggregates (still counted in
/// the sales total).
pub const DEFAULT_AGGREGATE_EXEMPT_MENU_NO: i64 = 11;

/// Dropdown label meaning "no service adjustment".
pub const SERVICE_NONE_LABEL: &str = "なし";
/// Dropdown label for the flat-deduction suggest service.
pub const SERVICE_SUGGEST_LABEL: &str = "サジェスト 　-100円";

/// Header and report-only fields carried on every sheet.
const HEADER_FIELDS: &[&str] = &[
    "weather",
    "temp",
    "departure_time",
    "arrival_time",
    "opening_time",
    "sold_out_time",
    "closing_time",
    "gasoline",
    "highway",
    "parking",
    "part",
    "others",
    "comment",
    "food_count_setting",
];

// ---------------------------------------------------------------------------
// Price resolution
// ---------------------------------------------------------------------------

/// Resolve a product's unit price for a location's price tier. An
/// unrecognized tier resolves to 0 with a warning.
pub fn resolve_price(product: &Product, price_type: &str) -> f64 {
    match price_type {
        "A" => product.price_a,
        "B" => product.price_b,
        "C" => product.price_c,
        other => {
            warn!(menu_no = product.no, price_type = %other, "unknown price tier, defaulting to 0");
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet construction
// ---------------------------------------------------------------------------

/// Build the daily sales sheet for one location.
///
/// Initial state: sales quantities 0, remaining = brought quantity, line
/// totals 0, discount counters "0", payments blank, service dropdown on
/// "なし". Call [`crate::events::page_load`] afterwards to run the
/// initial recomputation, as the entry screen does.
pub fn build_daily_sheet(
    date: &str,
    person_in_charge: &str,
    location: &SalesLocation,
    items: &[SheetItem],
) -> Result<FormState, SheetError> {
    let mut doc = FormDoc::new();
    doc.aggregate_exempt_menu_no = Some(DEFAULT_AGGREGATE_EXEMPT_MENU_NO);

    for item in items {
        let price = resolve_price(&item.product, &location.price_type);
        let binding = LineBinding::new(item.product.no, &item.product.name, price);
        doc.insert_field(
            &binding.quantity,
            FieldControl::Input {
                value: item.quantity.to_string(),
            },
        );
        doc.insert_field(
            &binding.sales_quantity,
            FieldControl::Input { value: "0".into() },
        );
        doc.insert_field(&binding.sold_out, FieldControl::Checkbox { checked: false });
        doc.insert_field(&binding.popular, FieldControl::Checkbox { checked: false });
        doc.insert_field(&binding.unpopular, FieldControl::Checkbox { checked: false });
        doc.insert_field(
            &binding.remaining,
            FieldControl::Output {
                value: item.quantity.to_string(),
                text: format_thousands(item.quantity),
            },
        );
        doc.insert_field(
            &binding.total_sales,
            FieldControl::Output {
                value: "0".into(),
                text: "0".into(),
            },
        );
        let menu_no = binding.menu_no;
        if !doc.register_line(binding) {
            return Err(SheetError::DuplicateMenuNo(menu_no));
        }
    }

    // Aggregate pairs
    for key in [
        FIELD_TOTAL_QUANTITY,
        FIELD_TOTAL_SALES_QUANTITY,
        FIELD_TOTAL_REMAINING,
        FIELD_TOTAL_SALES,
    ] {
        doc.insert_field(
            key,
            FieldControl::Output {
                value: "0".into(),
                text: "0".into(),
            },
        );
    }

    // Other-sales sub-form
    doc.insert_field(
        "selected_item_1",
        FieldControl::Input {
            value: String::new(),
        },
    );
    doc.insert_field(
        "selected_item_2",
        FieldControl::Input {
            value: String::new(),
        },
    );
    for key in OTHERS_INPUT_FIELDS {
        doc.insert_field(
            key,
            FieldControl::Input {
                value: String::new(),
            },
        );
    }
    doc.insert_field(
        FIELD_TOTAL_OTHERS_SALES,
        FieldControl::Input { value: "0".into() },
    );

    // Discount counters and the service dropdown
    for key in DISCOUNT_INPUT_FIELDS {
        doc.insert_field(key, FieldControl::Input { value: "0".into() });
    }
    doc.insert_field(
        FIELD_TOTAL_DISCOUNT,
        FieldControl::Input {
            value: String::new(),
        },
    );
    doc.insert_field(
        FIELD_SERVICE_NAME,
        FieldControl::Select {
            options: service_options(location),
            selected: 0,
        },
    );

    // Payments and reconciliation outputs
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

    doc.insert_field(FIELD_SOLD_OUT_TOTAL, FieldControl::Checkbox { checked: false });

    // Header and report-only fields
    doc.insert_field(
        "date",
        FieldControl::Input {
            value: date.to_string(),
        },
    );
    doc.insert_field(
        "location",
        FieldControl::Input {
            value: location.name.clone(),
        },
    );
    doc.insert_field(
        "location_no",
        FieldControl::Input {
            value: location.no.to_string(),
        },
    );
    doc.insert_field(
        "person_in_charge",
        FieldControl::Input {
            value: person_in_charge.to_string(),
        },
    );
    for key in HEADER_FIELDS {
        doc.insert_field(
            key,
            FieldControl::Input {
                value: String::new(),
            },
        );
    }

    info!(
        date = %date,
        location = %location.name,
        lines = items.len(),
        "daily sheet built"
    );
    Ok(FormState::new(doc))
}

/// Dropdown options for a location: "なし", the location's own named
/// service (at its service price), and the suggest option.
fn service_options(location: &SalesLocation) -> Vec<SelectOption> {
    let mut options = vec![SelectOption {
        label: SERVICE_NONE_LABEL.into(),
        value: "0".into(),
    }];
    let name = location.service_name.trim();
    if !name.is_empty() && name != SERVICE_NONE_LABEL {
        options.push(SelectOption {
            label: name.to_string(),
            value: location.service_price.to_string(),
        });
    }
    options.push(SelectOption {
        label: SERVICE_SUGGEST_LABEL.into(),
        value: "-100".into(),
    });
    options
}

// ---------------------------------------------------------------------------
// Payload intake
// ---------------------------------------------------------------------------

/// Build a sheet from a JSON payload:
/// `{date, personInCharge, location: {..}, items: [{no, name, priceA, .., quantity}]}`.
pub fn sheet_from_payload(payload: &Value) -> Result<FormState, String> {
    let date = value_str(payload, &["date"]).ok_or("Missing date")?;
    let person = value_str(payload, &["personInCharge", "person_in_charge"]).unwrap_or_default();

    let location_value = payload.get("location").ok_or("Missing location")?;
    let location = SalesLocation {
        no: value_i64(location_value, &["no"]).unwrap_or(0),
        name: value_str(location_value, &["name"]).ok_or("Missing location name")?,
        location_type: value_str(location_value, &["type", "locationType"]).unwrap_or_default(),
        price_type: value_str(location_value, &["priceType", "price_type"])
            .unwrap_or_else(|| "A".to_string()),
        service_name: value_str(location_value, &["serviceName", "service_name"])
            .unwrap_or_default(),
        service_price: value_i64(location_value, &["servicePrice", "service_price"]).unwrap_or(0),
        direct_return: value_i64(location_value, &["directReturn", "direct_return"]).unwrap_or(0),
    };

    let item_values = payload
        .get("items")
        .and_then(Value::as_array)
        .ok_or("Missing items")?;
    let mut items = Vec::with_capacity(item_values.len());
    for item in item_values {
        items.push(SheetItem {
            product: Product {
                no: value_i64(item, &["no", "menuNo"]).ok_or("Missing menu number")?,
                week: value_str(item, &["week"]).unwrap_or_default(),
                name: value_str(item, &["name"]).unwrap_or_else(|| "Item".to_string()),
                price_a: value_f64(item, &["priceA", "price_a"]).unwrap_or(0.0),
                price_b: value_f64(item, &["priceB", "price_b"]).unwrap_or(0.0),
                price_c: value_f64(item, &["priceC", "price_c"]).unwrap_or(0.0),
                container_type: value_str(item, &["containerType", "container_type"])
                    .unwrap_or_default(),
            },
            quantity: value_i64(item, &["quantity"]).unwrap_or(0),
        });
    }

    build_daily_sheet(&date, &person, &location, &items).map_err(|e| e.to_string())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_location() -> SalesLocation {
        SalesLocation {
            no: 3,
            name: "本町オフィス前".into(),
            location_type: "office".into(),
            price_type: "B".into(),
            service_name: "お茶サービス".into(),
            service_price: 650,
            direct_return: 0,
        }
    }

    fn test_product(no: i64, name: &str) -> Product {
        Product {
            no,
            week: "20250602".into(),
            name: name.into(),
            price_a: 600.0,
            price_b: 550.0,
            price_c: 500.0,
            container_type: "黒容器".into(),
        }
    }

    #[test]
    fn test_resolve_price_picks_tier() {
        let product = test_product(1, "からあげ弁当");
        assert_eq!(resolve_price(&product, "A"), 600.0);
        assert_eq!(resolve_price(&product, "B"), 550.0);
        assert_eq!(resolve_price(&product, "C"), 500.0);
        assert_eq!(resolve_price(&product, "D"), 0.0);
    }

    #[test]
    fn test_build_daily_sheet_registers_lines_and_fields() {
        let items = vec![
            SheetItem {
                product: test_product(1, "からあげ弁当"),
                quantity: 30,
            },
            SheetItem {
                product: test_product(2, "のり弁当"),
                quantity: 20,
            },
        ];
        let form = build_daily_sheet("2025-06-02", "山田 花子", &test_location(), &items).unwrap();
        let doc = form.doc.lock().unwrap();

        assert_eq!(doc.line_count(), 2);
        let line = doc.line(1).unwrap();
        assert_eq!(line.menu_name, "からあげ弁当");
        assert_eq!(line.unit_price, 550.0); // tier B
        assert_eq!(doc.input_value("quantity_1"), "30");
        assert_eq!(doc.input_value("sales_quantity_1"), "0");
        assert_eq!(doc.output_value("remaining_2"), "20");
        assert!(doc.has_field(FIELD_TOTAL_REVENUE));
        assert_eq!(doc.input_value("person_in_charge"), "山田 花子");
        assert_eq!(doc.input_value("location_no"), "3");
        assert_eq!(
            doc.aggregate_exempt_menu_no,
            Some(DEFAULT_AGGREGATE_EXEMPT_MENU_NO)
        );
    }

    #[test]
    fn test_build_daily_sheet_rejects_duplicate_menu_no() {
        let items = vec![
            SheetItem {
                product: test_product(5, "しゃけ弁当"),
                quantity: 10,
            },
            SheetItem {
                product: test_product(5, "重複"),
                quantity: 5,
            },
        ];
        let err = build_daily_sheet("2025-06-02", "", &test_location(), &items).unwrap_err();
        assert!(matches!(err, SheetError::DuplicateMenuNo(5)));
    }

    #[test]
    fn test_service_options_from_location() {
        let options = service_options(&test_location());
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].label, SERVICE_NONE_LABEL);
        assert_eq!(options[1].label, "お茶サービス");
        assert_eq!(options[1].value, "650");
        assert_eq!(options[2].label, SERVICE_SUGGEST_LABEL);
    }

    #[test]
    fn test_service_options_skip_blank_service() {
        let mut location = test_location();
        location.service_name = " ".into();
        let options = service_options(&location);
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_sheet_from_payload() {
        let payload = serde_json::json!({
            "date": "2025-06-02",
            "personInCharge": "山田 花子",
            "location": {
                "no": 3,
                "name": "本町オフィス前",
                "priceType": "A",
                "serviceName": "なし",
                "servicePrice": 0,
            },
            "items": [
                {"no": 1, "name": "からあげ弁当", "priceA": 600, "quantity": 30},
                {"no": 2, "name": "のり弁当", "priceA": 550.4, "quantity": 20},
            ],
        });
        let form = sheet_from_payload(&payload).unwrap();
        let doc = form.doc.lock().unwrap();
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line(2).unwrap().unit_price, 550.4);
        // "なし" never becomes a second dropdown entry
        let option = doc.selected_option(FIELD_SERVICE_NAME).unwrap();
        assert_eq!(option.label, SERVICE_NONE_LABEL);
    }

    #[test]
    fn test_sheet_from_payload_requires_date_and_items() {
        assert!(sheet_from_payload(&serde_json::json!({})).is_err());
        assert!(sheet_from_payload(&serde_json::json!({
            "date": "2025-06-02",
            "location": {"name": "x"},
        }))
        .is_err());
    }
}
