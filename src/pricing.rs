//! Normalizes upstream price strings into the `1.234,56` display form used
//! throughout rendered messages.

/// Formats a raw upstream price string. Returns `None` for missing/blank
/// input and falls back to the original string on anything unparseable —
/// a bad price should never block a suggestion from being generated.
pub fn format_price(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let value = if raw.chars().all(|c| c.is_ascii_digit()) {
        // Bare digit strings are the literal major value, e.g. "4429" -> 4429.00.
        raw.parse::<i64>().ok().map(|units| units as f64)
    } else if raw.contains('.') && raw.contains(',') {
        let normalized = raw.replace('.', "").replace(',', ".");
        normalized.parse::<f64>().ok()
    } else {
        let normalized = raw.replace(',', ".");
        normalized.parse::<f64>().ok()
    };

    match value {
        Some(v) => Some(format_brl(v)),
        None => Some(raw.to_string()),
    }
}

fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let major = cents / 100;
    let minor = cents % 100;

    let major_str = major.to_string();
    let mut grouped = String::new();
    for (i, c) in major_str.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{minor:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_for_missing_or_blank() {
        assert_eq!(format_price(None), None);
        assert_eq!(format_price(Some("   ")), None);
    }

    #[test]
    fn bare_digits_treated_as_literal_major_value() {
        assert_eq!(format_price(Some("4429")), Some("4.429,00".to_string()));
    }

    #[test]
    fn dot_thousands_comma_decimal_input() {
        assert_eq!(format_price(Some("1.234,56")), Some("1.234,56".to_string()));
    }

    #[test]
    fn comma_decimal_without_thousands() {
        assert_eq!(format_price(Some("99,9")), Some("99,90".to_string()));
    }

    #[test]
    fn unparseable_returned_unchanged() {
        assert_eq!(format_price(Some("call for price")), Some("call for price".to_string()));
    }

    #[test]
    fn output_round_trips() {
        let once = format_price(Some("123456")).unwrap();
        let twice = format_price(Some(&once)).unwrap();
        assert_eq!(once, twice);
    }
}
