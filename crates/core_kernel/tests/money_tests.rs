//! Comprehensive unit tests for the Money module
//!
//! Tests cover money creation, arithmetic operations, the half-up rounding
//! contract, currency handling, and tax rate application.

use core_kernel::{round_money, Currency, Money, MoneyError, TaxRate};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(100.50), Currency::ZAR);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::ZAR);
    }

    #[test]
    fn test_new_rounds_to_two_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::ZAR);
        assert_eq!(m.amount(), dec!(100.12));
    }

    #[test]
    fn test_new_rounds_midpoints_away_from_zero() {
        assert_eq!(Money::new(dec!(20.005), Currency::ZAR).amount(), dec!(20.01));
        assert_eq!(Money::new(dec!(-20.005), Currency::ZAR).amount(), dec!(-20.01));
    }

    #[test]
    fn test_from_minor_converts_cents_correctly() {
        let m = Money::from_minor(10050, Currency::ZAR);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::EUR);
    }

    #[test]
    fn test_negative_amount_creation() {
        let m = Money::new(dec!(-100.00), Currency::ZAR);
        assert!(m.is_negative());
        assert_eq!(m.amount(), dec!(-100.00));
    }
}

mod predicates {
    use super::*;

    #[test]
    fn test_is_zero_true_for_zero_amount() {
        assert!(Money::zero(Currency::ZAR).is_zero());
    }

    #[test]
    fn test_is_zero_false_for_positive_amount() {
        assert!(!Money::new(dec!(0.01), Currency::ZAR).is_zero());
    }

    #[test]
    fn test_is_positive_false_for_zero() {
        assert!(!Money::zero(Currency::ZAR).is_positive());
    }

    #[test]
    fn test_is_positive_false_for_negative() {
        assert!(!Money::new(dec!(-100.00), Currency::ZAR).is_positive());
    }

    #[test]
    fn test_is_negative_true_for_negative_amount() {
        assert!(Money::new(dec!(-100.00), Currency::ZAR).is_negative());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_same_currency() {
        let a = Money::new(dec!(100.00), Currency::ZAR);
        let b = Money::new(dec!(50.00), Currency::ZAR);
        let result = a.checked_add(&b).unwrap();
        assert_eq!(result.amount(), dec!(150.00));
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let a = Money::new(dec!(100.00), Currency::ZAR);
        let b = Money::new(dec!(50.00), Currency::EUR);
        let result = a.checked_add(&b);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_checked_sub_can_go_negative() {
        let a = Money::new(dec!(30.00), Currency::ZAR);
        let b = Money::new(dec!(100.00), Currency::ZAR);
        let result = a.checked_sub(&b).unwrap();
        assert_eq!(result.amount(), dec!(-70.00));
    }

    #[test]
    fn test_add_operator_same_currency() {
        let a = Money::new(dec!(100.00), Currency::ZAR);
        let b = Money::new(dec!(50.00), Currency::ZAR);
        assert_eq!((a + b).amount(), dec!(150.00));
    }

    #[test]
    fn test_negation() {
        let m = Money::new(dec!(100.00), Currency::ZAR);
        assert_eq!((-m).amount(), dec!(-100.00));
    }

    #[test]
    fn test_multiply_by_quantity() {
        let m = Money::new(dec!(10.005), Currency::ZAR);
        // Amount is stored rounded to 10.01; 10.01 * 2 = 20.02
        let result = m.multiply(dec!(2));
        assert_eq!(result.amount(), dec!(20.02));
    }

    #[test]
    fn test_multiply_rounds_result() {
        let m = Money::new(dec!(5.00), Currency::ZAR);
        let result = m.multiply(dec!(0.333));
        assert_eq!(result.amount(), dec!(1.67));
    }

    #[test]
    fn test_multiply_by_zero() {
        let m = Money::new(dec!(100.00), Currency::ZAR);
        assert!(m.multiply(dec!(0)).is_zero());
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
        assert_eq!(round_money(dec!(2.674)), dec!(2.67));
        assert_eq!(round_money(dec!(2.665)), dec!(2.67));
    }

    #[test]
    fn test_round_money_negative_midpoint_away_from_zero() {
        assert_eq!(round_money(dec!(-2.675)), dec!(-2.68));
    }

    #[test]
    fn test_round_money_preserves_exact_values() {
        assert_eq!(round_money(dec!(100.00)), dec!(100.00));
        assert_eq!(round_money(dec!(0.01)), dec!(0.01));
    }
}

mod tax_rates {
    use super::*;

    #[test]
    fn test_from_percentage_bounds() {
        assert!(TaxRate::from_percentage(dec!(0)).is_ok());
        assert!(TaxRate::from_percentage(dec!(15)).is_ok());
        assert!(TaxRate::from_percentage(dec!(100)).is_ok());
        assert!(TaxRate::from_percentage(dec!(100.01)).is_err());
        assert!(TaxRate::from_percentage(dec!(-0.01)).is_err());
    }

    #[test]
    fn test_apply_rounds_half_up() {
        let rate = TaxRate::from_percentage(dec!(15)).unwrap();
        // 25.01 * 0.15 = 3.7515 -> 3.75
        let tax = rate.apply(&Money::new(dec!(25.01), Currency::ZAR));
        assert_eq!(tax.amount(), dec!(3.75));
    }

    #[test]
    fn test_zero_rate_yields_zero_tax() {
        let tax = TaxRate::zero().apply(&Money::new(dec!(999.99), Currency::ZAR));
        assert!(tax.is_zero());
    }

    #[test]
    fn test_display() {
        let rate = TaxRate::from_percentage(dec!(15)).unwrap();
        assert_eq!(rate.to_string(), "15%");
    }
}

mod currency {
    use super::*;

    #[test]
    fn test_all_currencies_have_symbols() {
        let currencies = [Currency::ZAR, Currency::USD, Currency::EUR, Currency::GBP];

        for currency in currencies {
            assert!(!currency.symbol().is_empty());
            assert!(!currency.code().is_empty());
            assert_eq!(currency.decimal_places(), 2);
        }
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::ZAR.code(), "ZAR");
        assert_eq!(Currency::USD.code(), "USD");
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(format!("{}", Currency::ZAR), "ZAR");
    }
}

mod ordering {
    use super::*;

    #[test]
    fn test_same_currency_amounts_compare() {
        let a = Money::new(dec!(100.00), Currency::ZAR);
        let b = Money::new(dec!(50.00), Currency::ZAR);
        assert!(a > b);
        assert!(b < a);
    }

    #[test]
    fn test_cross_currency_comparison_is_undefined() {
        let zar = Money::new(dec!(100.00), Currency::ZAR);
        let usd = Money::new(dec!(100.00), Currency::USD);
        assert!(zar.partial_cmp(&usd).is_none());
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_money_json_roundtrip() {
        let m = Money::new(dec!(100.50), Currency::ZAR);
        let json = serde_json::to_string(&m).unwrap();
        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }

    #[test]
    fn test_currency_serializes_as_code() {
        let json = serde_json::to_string(&Currency::ZAR).unwrap();
        assert_eq!(json, "\"ZAR\"");
    }
}
