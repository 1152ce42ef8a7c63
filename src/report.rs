//! Daily-report snapshot assembly.
//!
//! On send, the sheet's current field values are collected into one
//! serializable payload: header, the four aggregates, other sales,
//! discounts, payments, the reconciliation figures, operating times,
//! expenses, and one entry per menu line. Formatted fields go back
//! through the sign-marker parser, so the payload carries plain numbers.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::{
    FormState, FIELD_SALES_DIFFERENCE, FIELD_SERVICE_NAME, FIELD_TOTAL_DISCOUNT,
    FIELD_TOTAL_OTHERS_SALES, FIELD_TOTAL_QUANTITY, FIELD_TOTAL_REMAINING, FIELD_TOTAL_REVENUE,
    FIELD_TOTAL_SALES, FIELD_TOTAL_SALES_QUANTITY,
};
use crate::lines::derive_line;
use crate::numfmt::{parse_int_loose, parse_signed_amount};

/// One menu line of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub product: String,
    pub quantity: i64,
    pub sales_quantity: i64,
    pub remaining: i64,
    pub total_sales: i64,
    pub sold_out: bool,
    pub popular: bool,
    pub unpopular: bool,
}

/// The assembled daily report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub report_id: String,
    pub date: String,
    pub location: String,
    pub location_no: i64,
    pub person_in_charge: String,
    pub weather: String,
    pub temp: String,
    pub total_quantity: i64,
    pub total_sales_quantity: i64,
    pub total_remaining: i64,
    pub total_sales: i64,
    pub others_sales_1: String,
    pub others_price1: i64,
    pub others_sales_quantity1: i64,
    pub others_sales_2: String,
    pub others_price2: i64,
    pub others_sales_quantity2: i64,
    pub total_others_sales: i64,
    pub no_rice_quantity: i64,
    pub extra_rice_quantity: i64,
    pub coupon_type_600: i64,
    pub coupon_type_700: i64,
    pub discount_50: i64,
    pub discount_100: i64,
    pub service_name: String,
    pub service_price: i64,
    pub service_type_600: i64,
    pub service_type_700: i64,
    pub service_type_100: i64,
    pub total_discount: i64,
    pub paypay: i64,
    pub digital_payment: i64,
    pub cash: i64,
    pub total_revenue: i64,
    pub sales_difference: i64,
    pub departure_time: String,
    pub arrival_time: String,
    pub opening_time: String,
    pub sold_out_time: String,
    pub closing_time: String,
    pub gasoline: i64,
    pub highway: i64,
    pub parking: i64,
    pub part: i64,
    pub others: i64,
    pub comment: String,
    pub food_count_setting: String,
    pub updated_at: String,
    pub entries: Vec<ReportEntry>,
}

/// Assemble the report from the sheet's current field values. Line
/// entries are re-derived from quantity/price/sales, the same way the
/// aggregator reads them.
pub fn build_report(form: &FormState) -> Result<DailyReport, String> {
    let doc = form.doc.lock().map_err(|e| e.to_string())?;

    let entries: Vec<ReportEntry> = doc
        .lines()
        .map(|binding| {
            let figures = derive_line(&doc, binding);
            ReportEntry {
                product: binding.menu_name.clone(),
                quantity: figures.quantity,
                sales_quantity: figures.sales_quantity,
                remaining: figures.remaining,
                total_sales: figures.line_total,
                sold_out: doc.checkbox(&binding.sold_out),
                popular: doc.checkbox(&binding.popular),
                unpopular: doc.checkbox(&binding.unpopular),
            }
        })
        .collect();

    let (service_name, service_price) = match doc.selected_option(FIELD_SERVICE_NAME) {
        Some(option) => (option.label.clone(), parse_int_loose(&option.value)),
        None => (String::new(), 0),
    };

    Ok(DailyReport {
        report_id: Uuid::new_v4().to_string(),
        date: doc.input_value("date"),
        location: doc.input_value("location"),
        location_no: parse_int_loose(&doc.input_value("location_no")),
        person_in_charge: doc.input_value("person_in_charge"),
        weather: doc.input_value("weather"),
        temp: doc.input_value("temp"),
        total_quantity: parse_int_loose(&doc.output_value(FIELD_TOTAL_QUANTITY)),
        total_sales_quantity: parse_int_loose(&doc.output_value(FIELD_TOTAL_SALES_QUANTITY)),
        total_remaining: parse_int_loose(&doc.output_value(FIELD_TOTAL_REMAINING)),
        total_sales: parse_int_loose(&doc.output_value(FIELD_TOTAL_SALES)),
        others_sales_1: doc.input_value("selected_item_1"),
        others_price1: parse_int_loose(&doc.input_value("others_price1")),
        others_sales_quantity1: parse_int_loose(&doc.input_value("others_sales_quantity1")),
        others_sales_2: doc.input_value("selected_item_2"),
        others_price2: parse_int_loose(&doc.input_value("others_price2")),
        others_sales_quantity2: parse_int_loose(&doc.input_value("others_sales_quantity2")),
        total_others_sales: parse_signed_amount(&doc.input_value(FIELD_TOTAL_OTHERS_SALES)),
        no_rice_quantity: parse_int_loose(&doc.input_value("no_rice_quantity")),
        extra_rice_quantity: parse_int_loose(&doc.input_value("extra_rice_quantity")),
        coupon_type_600: parse_int_loose(&doc.input_value("coupon_type_600")),
        coupon_type_700: parse_int_loose(&doc.input_value("coupon_type_700")),
        discount_50: parse_int_loose(&doc.input_value("discount_50")),
        discount_100: parse_int_loose(&doc.input_value("discount_100")),
        service_name,
        service_price,
        service_type_600: parse_int_loose(&doc.input_value("service_type_600")),
        service_type_700: parse_int_loose(&doc.input_value("service_type_700")),
        service_type_100: parse_int_loose(&doc.input_value("service_type_100")),
        total_discount: parse_signed_amount(&doc.input_value(FIELD_TOTAL_DISCOUNT)),
        paypay: parse_int_loose(&doc.input_value("paypay")),
        digital_payment: parse_int_loose(&doc.input_value("digital_payment")),
        cash: parse_int_loose(&doc.input_value("cash")),
        total_revenue: parse_signed_amount(&doc.input_value(FIELD_TOTAL_REVENUE)),
        sales_difference: parse_signed_amount(&doc.input_value(FIELD_SALES_DIFFERENCE)),
        departure_time: doc.input_value("departure_time"),
        arrival_time: doc.input_value("arrival_time"),
        opening_time: doc.input_value("opening_time"),
        sold_out_time: doc.input_value("sold_out_time"),
        closing_time: doc.input_value("closing_time"),
        gasoline: parse_int_loose(&doc.input_value("gasoline")),
        highway: parse_int_loose(&doc.input_value("highway")),
        parking: parse_int_loose(&doc.input_value("parking")),
        part: parse_int_loose(&doc.input_value("part")),
        others: parse_int_loose(&doc.input_value("others")),
        comment: doc.input_value("comment"),
        food_count_setting: doc.input_value("food_count_setting"),
        updated_at: Utc::now().to_rfc3339(),
        entries,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
