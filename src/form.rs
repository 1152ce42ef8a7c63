//! In-memory form document for the daily sales sheet.
//!
//! The sheet's controls live here as string-valued fields; calculators
//! read and write them through the adapters on [`FormDoc`] and re-derive
//! everything from the current values on each pass (no cached derived
//! state). Frontends bind their widgets to the same keys and forward
//! events through [`crate::events`].
//!
//! Missing fields are never fatal: reads fall back to the type's empty
//! default and writes are skipped, both with a diagnostic, so a sheet
//! variant that omits a block (no service dropdown, no other-sales rows)
//! still recomputes everything it does have.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::{error, warn};

use crate::numfmt;

// ---------------------------------------------------------------------------
// Field keys
// ---------------------------------------------------------------------------

pub const FIELD_TOTAL_QUANTITY: &str = "total_quantity";
pub const FIELD_TOTAL_SALES_QUANTITY: &str = "total_sales_quantity";
pub const FIELD_TOTAL_REMAINING: &str = "total_remaining";
/// Aggregate sales pair; "total_total_sales" because "total_sales_{n}"
/// names the per-line pairs.
pub const FIELD_TOTAL_SALES: &str = "total_total_sales";
pub const FIELD_TOTAL_OTHERS_SALES: &str = "total_others_sales";
pub const FIELD_TOTAL_DISCOUNT: &str = "total_discount";
pub const FIELD_TOTAL_REVENUE: &str = "total_revenue";
pub const FIELD_SALES_DIFFERENCE: &str = "sales_difference";
pub const FIELD_SERVICE_NAME: &str = "service_name";
pub const FIELD_SOLD_OUT_TOTAL: &str = "sold_out_total";

/// The other-sales sub-form inputs sharing one bulk listener.
pub const OTHERS_INPUT_FIELDS: &[&str] = &[
    "others_price1",
    "others_sales_quantity1",
    "others_price2",
    "others_sales_quantity2",
];

/// Discount counters, including the service tier counters.
pub const DISCOUNT_INPUT_FIELDS: &[&str] = &[
    "no_rice_quantity",
    "extra_rice_quantity",
    "coupon_type_600",
    "coupon_type_700",
    "discount_50",
    "discount_100",
    "service_type_600",
    "service_type_700",
    "service_type_100",
];

/// Payment-method inputs feeding the reconciliation.
pub const PAYMENT_INPUT_FIELDS: &[&str] = &["paypay", "digital_payment", "cash"];

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// One form control and its current state.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldControl {
    /// Plain input holding its raw string value.
    Input { value: String },
    /// Hidden value + formatted display text, updated together.
    Output { value: String, text: String },
    Checkbox { checked: bool },
    /// Dropdown; options carry a display label and a numeric value string.
    Select {
        options: Vec<SelectOption>,
        selected: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Line registry
// ---------------------------------------------------------------------------

/// Field keys of one menu line, derived once at sheet construction so
/// calculators never re-split field names at runtime.
#[derive(Debug, Clone)]
pub struct LineBinding {
    pub menu_no: i64,
    pub menu_name: String,
    /// Unit price attribute carried by the sales-quantity input.
    pub unit_price: f64,
    pub quantity: String,
    pub sales_quantity: String,
    pub sold_out: String,
    pub popular: String,
    pub unpopular: String,
    pub remaining: String,
    pub total_sales: String,
}

impl LineBinding {
    pub fn new(menu_no: i64, menu_name: &str, unit_price: f64) -> Self {
        Self {
            menu_no,
            menu_name: menu_name.to_string(),
            unit_price,
            quantity: format!("quantity_{menu_no}"),
            sales_quantity: format!("sales_quantity_{menu_no}"),
            sold_out: format!("sold_out_{menu_no}"),
            popular: format!("popular_{menu_no}"),
            unpopular: format!("unpopular_{menu_no}"),
            remaining: format!("remaining_{menu_no}"),
            total_sales: format!("total_sales_{menu_no}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The sheet's field set plus the typed line registry.
#[derive(Debug, Default)]
pub struct FormDoc {
    fields: BTreeMap<String, FieldControl>,
    lines: BTreeMap<i64, LineBinding>,
    /// Menu line kept out of the quantity aggregates (still counted in
    /// the sales total).
    pub aggregate_exempt_menu_no: Option<i64>,
}

impl FormDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_field(&mut self, key: &str, control: FieldControl) {
        self.fields.insert(key.to_string(), control);
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Register a line binding. Returns false when the menu number is
    /// already taken (the registry must stay unambiguous).
    pub fn register_line(&mut self, binding: LineBinding) -> bool {
        use std::collections::btree_map::Entry;
        match self.lines.entry(binding.menu_no) {
            Entry::Vacant(slot) => {
                slot.insert(binding);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn line(&self, menu_no: i64) -> Option<&LineBinding> {
        self.lines.get(&menu_no)
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineBinding> {
        self.lines.values()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Resolve the line a per-line field belongs to. Field names embed
    /// the menu number as their third underscore-delimited token
    /// ("sales_quantity_7", "sold_out_7").
    pub fn line_for_field(&self, name: &str) -> Option<&LineBinding> {
        let menu_no = name.split('_').nth(2)?.parse::<i64>().ok()?;
        let binding = self.lines.get(&menu_no);
        if binding.is_none() {
            warn!(field = %name, "no registered line for field");
        }
        binding
    }

    // -- Read adapters ------------------------------------------------------

    /// Current value of an input control. Missing fields read as empty.
    pub fn input_value(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(FieldControl::Input { value }) => value.clone(),
            Some(_) => {
                warn!(field = %key, "field is not an input");
                String::new()
            }
            None => {
                warn!(field = %key, "input not found");
                String::new()
            }
        }
    }

    /// Raw (hidden) half of an output pair.
    pub fn output_value(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(FieldControl::Output { value, .. }) => value.clone(),
            Some(_) => {
                warn!(field = %key, "field is not an output pair");
                String::new()
            }
            None => {
                warn!(field = %key, "output pair not found");
                String::new()
            }
        }
    }

    /// Formatted (display) half of an output pair.
    pub fn output_text(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(FieldControl::Output { text, .. }) => text.clone(),
            Some(_) => {
                warn!(field = %key, "field is not an output pair");
                String::new()
            }
            None => {
                warn!(field = %key, "output pair not found");
                String::new()
            }
        }
    }

    /// Checkbox state. An absent box reads as unchecked, without noise:
    /// some sheet variants simply do not carry every checkbox.
    pub fn checkbox(&self, key: &str) -> bool {
        match self.fields.get(key) {
            Some(FieldControl::Checkbox { checked }) => *checked,
            Some(_) => {
                warn!(field = %key, "field is not a checkbox");
                false
            }
            None => false,
        }
    }

    /// Currently selected dropdown option, if the dropdown exists.
    pub fn selected_option(&self, key: &str) -> Option<&SelectOption> {
        match self.fields.get(key) {
            Some(FieldControl::Select { options, selected }) => options.get(*selected),
            _ => None,
        }
    }

    // -- Write adapters -----------------------------------------------------

    pub fn set_input_value(&mut self, key: &str, value: &str) {
        match self.fields.get_mut(key) {
            Some(FieldControl::Input { value: current }) => *current = value.to_string(),
            Some(_) => error!(field = %key, "field is not an input, update skipped"),
            None => error!(field = %key, "input not found, update skipped"),
        }
    }

    /// Write an output pair: raw value plus thousands-formatted text.
    pub fn set_output(&mut self, key: &str, value: i64) {
        match self.fields.get_mut(key) {
            Some(FieldControl::Output {
                value: current,
                text,
            }) => {
                *current = value.to_string();
                *text = numfmt::format_thousands(value);
            }
            Some(_) => error!(field = %key, "field is not an output pair, update skipped"),
            None => error!(field = %key, "output pair not found, update skipped"),
        }
    }

    pub fn set_checkbox(&mut self, key: &str, checked: bool) {
        match self.fields.get_mut(key) {
            Some(FieldControl::Checkbox { checked: current }) => *current = checked,
            Some(_) => error!(field = %key, "field is not a checkbox, update skipped"),
            None => error!(field = %key, "checkbox not found, update skipped"),
        }
    }

    /// Select a dropdown option by index.
    pub fn select_index(&mut self, key: &str, index: usize) -> Result<(), String> {
        match self.fields.get_mut(key) {
            Some(FieldControl::Select { options, selected }) => {
                if index >= options.len() {
                    return Err(format!("Option index {index} out of range for {key}"));
                }
                *selected = index;
                Ok(())
            }
            Some(_) => Err(format!("Field is not a select: {key}")),
            None => Err(format!("Select not found: {key}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Form state handed to the event layer and the recomputation pipeline.
#[derive(Debug)]
pub struct FormState {
    pub doc: Mutex<FormDoc>,
}

impl FormState {
    pub fn new(doc: FormDoc) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
