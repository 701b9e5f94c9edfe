//! Property tests for the pure scoring and price-formatting functions:
//! determinism and idempotent round-tripping under arbitrary inputs.

use proptest::prelude::*;

use promoflow::pricing::format_price;
use promoflow::scoring::{ScoreInputs, score};

proptest! {
    #[test]
    fn score_is_deterministic_for_equal_inputs(
        commission in proptest::option::of(0.0f64..2.0),
        rating in proptest::option::of(0.0f64..5.0),
        sales in proptest::option::of(0.0f64..1_000_000.0),
        discount in proptest::option::of(0.0f64..100.0),
    ) {
        let inputs = ScoreInputs {
            commission_rate: commission,
            rating_star: rating,
            sales,
            discount_rate: discount,
        };
        prop_assert_eq!(score(inputs), score(inputs));
    }

    #[test]
    fn score_never_exceeds_sales_cap_contribution(sales in 0.0f64..10_000_000.0) {
        let capped = score(ScoreInputs { sales: Some(5000.0), ..Default::default() });
        let observed = score(ScoreInputs { sales: Some(sales), ..Default::default() });
        if sales >= 5000.0 {
            prop_assert_eq!(observed, capped);
        } else {
            prop_assert!(observed <= capped);
        }
    }

    #[test]
    fn formatted_price_round_trips_once_stable(cents in 0i64..100_000_000) {
        let raw = cents.to_string();
        let once = format_price(Some(&raw)).expect("digits always parse");
        let twice = format_price(Some(&once)).expect("already-formatted price reparses");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn formatted_price_is_never_blank_for_numeric_input(cents in 1i64..100_000_000) {
        let formatted = format_price(Some(&cents.to_string())).unwrap();
        prop_assert!(!formatted.trim().is_empty());
        prop_assert!(formatted.contains(','));
    }
}
