//! Composite ranking score for a catalog node.
//!
//! Deterministic and pure: identical inputs always produce an identical
//! score, rounded to 4 decimal places.

/// Raw numeric inputs a scored node may carry; every field is optional
/// because upstream payloads are inconsistent about which fields are
/// present for a given product.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInputs {
    pub commission_rate: Option<f64>,
    pub rating_star: Option<f64>,
    pub sales: Option<f64>,
    pub discount_rate: Option<f64>,
}

/// Parses a commission-rate/rating string that may use either `.` or `,` as
/// the decimal separator, as upstream payloads do inconsistently.
pub fn parse_lenient(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().or_else(|| trimmed.replace(',', ".").parse::<f64>().ok())
}

pub fn score(inputs: ScoreInputs) -> f64 {
    let commission = inputs.commission_rate.unwrap_or(0.0);
    let rating = inputs.rating_star.unwrap_or(0.0);
    let sales = inputs.sales.unwrap_or(0.0).min(5000.0);
    let discount = inputs.discount_rate.unwrap_or(0.0);

    let raw = commission * 100.0 + rating * 2.0 + sales / 200.0 + discount / 10.0;
    round4(raw)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_on_empty_inputs() {
        assert_eq!(score(ScoreInputs::default()), 0.0);
    }

    #[test]
    fn sales_is_capped_at_5000() {
        let under = score(ScoreInputs { sales: Some(5000.0), ..Default::default() });
        let over = score(ScoreInputs { sales: Some(50_000.0), ..Default::default() });
        assert_eq!(under, over);
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        let inputs = ScoreInputs {
            commission_rate: Some(0.12),
            rating_star: Some(4.8),
            sales: Some(1200.0),
            discount_rate: Some(15.0),
        };
        assert_eq!(score(inputs), score(inputs));
    }

    #[test]
    fn parses_comma_and_dot_decimals() {
        assert_eq!(parse_lenient("4,8"), Some(4.8));
        assert_eq!(parse_lenient("4.8"), Some(4.8));
        assert_eq!(parse_lenient(""), None);
    }

    #[test]
    fn matches_hand_computed_value() {
        let inputs = ScoreInputs {
            commission_rate: Some(0.1),
            rating_star: Some(5.0),
            sales: Some(400.0),
            discount_rate: Some(20.0),
        };
        // 0.1*100 + 5*2 + 400/200 + 20/10 = 10 + 10 + 2 + 2 = 24
        assert_eq!(score(inputs), 24.0);
    }
}
