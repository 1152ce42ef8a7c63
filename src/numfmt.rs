//! Number parsing and formatting for the daily sales sheet.
//!
//! Parsing is uniformly defensive: a value that cannot be parsed counts
//! as zero, so a half-typed field never breaks a recomputation pass.
//! Formatting follows the sheet's display conventions: comma thousands
//! separators, the ▲/＋ markers on the discount total, and ±0 when the
//! payment reconciliation comes out exact.

/// Marker prefixed to negative discount amounts and payment shortfalls.
pub const SHORTFALL_MARK: char = '▲';
/// Full-width plus prefixed to non-negative discount amounts.
pub const SURPLUS_MARK: char = '＋';

/// Round to the nearest integer, halves toward positive infinity.
pub fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Group an integer with comma separators: 1234567 -> "1,234,567".
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Parse an integer leniently: commas are stripped, fractional input is
/// truncated, anything else counts as zero.
pub fn parse_int_loose(raw: &str) -> i64 {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return 0;
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return n;
    }
    cleaned.parse::<f64>().map(|f| f as i64).unwrap_or(0)
}

/// Parse a float leniently: commas are stripped, failure counts as zero.
pub fn parse_float_loose(raw: &str) -> f64 {
    let cleaned = raw.trim().replace(',', "");
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Parse a formatted amount by discarding everything that is not a
/// digit, dot, or minus. Used on display strings that carry separators
/// or currency decoration.
pub fn strip_to_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Parse an amount carrying a sign marker: "▲1,200" -> -1200,
/// "＋300" / "+300" -> 300, "±0" -> 0. Markerless input parses as-is.
pub fn parse_signed_amount(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    if let Some(rest) = trimmed.strip_prefix(SHORTFALL_MARK) {
        return -parse_int_loose(rest);
    }
    let rest = trimmed
        .strip_prefix(SURPLUS_MARK)
        .or_else(|| trimmed.strip_prefix('±'))
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    parse_int_loose(rest)
}

/// Format a discount total: "▲" + |n| when negative, "＋" + n otherwise.
pub fn format_signed_amount(n: i64) -> String {
    if n < 0 {
        format!("{SHORTFALL_MARK}{}", format_thousands(n.saturating_abs()))
    } else {
        format!("{SURPLUS_MARK}{}", format_thousands(n))
    }
}

/// Format a payment difference: "±0" when exact, "▲" + |n| for a
/// shortfall, "+" + n for a surplus.
pub fn format_difference(n: i64) -> String {
    if n == 0 {
        "±0".to_string()
    } else if n < 0 {
        format!("{SHORTFALL_MARK}{}", format_thousands(n.saturating_abs()))
    } else {
        format!("+{}", format_thousands(n))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands_groups_digits() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(-1234), "-1,234");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.4), 2);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-1.5), -1);
        assert_eq!(round_half_up(350.0), 350);
    }

    #[test]
    fn test_parse_int_loose() {
        assert_eq!(parse_int_loose("42"), 42);
        assert_eq!(parse_int_loose(" 1,200 "), 1200);
        assert_eq!(parse_int_loose("12.9"), 12);
        assert_eq!(parse_int_loose(""), 0);
        assert_eq!(parse_int_loose("abc"), 0);
        assert_eq!(parse_int_loose("-30"), -30);
    }

    #[test]
    fn test_parse_float_loose() {
        assert_eq!(parse_float_loose("150.5"), 150.5);
        assert_eq!(parse_float_loose("1,050"), 1050.0);
        assert_eq!(parse_float_loose(""), 0.0);
        assert_eq!(parse_float_loose("n/a"), 0.0);
    }

    #[test]
    fn test_strip_to_number_drops_decoration() {
        assert_eq!(strip_to_number("1,234"), 1234.0);
        assert_eq!(strip_to_number("¥12,000"), 12000.0);
        assert_eq!(strip_to_number(""), 0.0);
        assert_eq!(strip_to_number("--"), 0.0);
    }

    #[test]
    fn test_parse_signed_amount_handles_markers() {
        assert_eq!(parse_signed_amount("▲1,200"), -1200);
        assert_eq!(parse_signed_amount("＋300"), 300);
        assert_eq!(parse_signed_amount("+300"), 300);
        assert_eq!(parse_signed_amount("±0"), 0);
        assert_eq!(parse_signed_amount("450"), 450);
        assert_eq!(parse_signed_amount(""), 0);
    }

    #[test]
    fn test_format_signed_amount() {
        assert_eq!(format_signed_amount(-50), "▲50");
        assert_eq!(format_signed_amount(0), "＋0");
        assert_eq!(format_signed_amount(120), "＋120");
        assert_eq!(format_signed_amount(-1200), "▲1,200");
    }

    #[test]
    fn test_format_difference() {
        assert_eq!(format_difference(0), "±0");
        assert_eq!(format_difference(-50), "▲50");
        assert_eq!(format_difference(250), "+250");
        assert_eq!(format_difference(-12345), "▲12,345");
    }

    #[test]
    fn test_signed_round_trip() {
        for n in [-12345, -1, 0, 7, 9999] {
            assert_eq!(parse_signed_amount(&format_signed_amount(n)), n);
        }
    }
}
