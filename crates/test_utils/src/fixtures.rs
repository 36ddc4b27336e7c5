//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the billing
//! engine. These fixtures are designed to be consistent and predictable for
//! unit tests.

use chrono::NaiveDate;
use core_kernel::{ClientId, Currency, InvoiceId, Money, PaymentId, QuotationId, TaxRate};
use rust_decimal_macros::dec;
use uuid::Uuid;

use domain_client::ContactSnapshot;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Creates a standard ZAR amount for testing
    pub fn zar_100() -> Money {
        Money::new(dec!(100.00), Currency::ZAR)
    }

    /// Creates a typical invoice total
    pub fn zar_total() -> Money {
        Money::new(dec!(11500.00), Currency::ZAR)
    }

    /// Creates a zero amount
    pub fn zar_zero() -> Money {
        Money::zero(Currency::ZAR)
    }

    /// Creates a USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for tax rates
pub struct TaxFixtures;

impl TaxFixtures {
    /// Standard South African VAT rate
    pub fn vat_15() -> TaxRate {
        TaxRate::from_percentage(dec!(15)).unwrap()
    }

    /// Zero-rated documents
    pub fn zero_rated() -> TaxRate {
        TaxRate::from_percentage(dec!(0)).unwrap()
    }
}

/// Fixture for date test data
pub struct DateFixtures;

impl DateFixtures {
    /// Standard issue date (Mar 1, 2025)
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    /// Standard quotation expiry date (Mar 31, 2025)
    pub fn expiry_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    /// Standard invoice due date (Mar 31, 2025)
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    /// A day before the due date
    pub fn before_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 30).unwrap()
    }

    /// A day past the due date
    pub fn past_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic client ID for testing
    pub fn client_id() -> ClientId {
        ClientId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic quotation ID for testing
    pub fn quotation_id() -> QuotationId {
        QuotationId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic invoice ID for testing
    pub fn invoice_id() -> InvoiceId {
        InvoiceId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic payment ID for testing
    pub fn payment_id() -> PaymentId {
        PaymentId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }
}

/// Fixture for contact snapshots
pub struct ContactFixtures;

impl ContactFixtures {
    /// A full contact snapshot
    pub fn acme() -> ContactSnapshot {
        ContactSnapshot {
            name: "Acme Studio".to_string(),
            email: "billing@acme.example".to_string(),
            phone: Some("+27 21 555 0100".to_string()),
            address: Some("1 Long Street, Cape Town".to_string()),
        }
    }

    /// A minimal contact snapshot with only the required fields
    pub fn minimal() -> ContactSnapshot {
        ContactSnapshot {
            name: "Solo Consulting".to_string(),
            email: "solo@consulting.example".to_string(),
            phone: None,
            address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_deterministic() {
        assert_eq!(IdFixtures::client_id(), IdFixtures::client_id());
        assert_eq!(DateFixtures::issue_date(), DateFixtures::issue_date());
    }

    #[test]
    fn test_past_due_is_after_due_date() {
        assert!(DateFixtures::past_due() > DateFixtures::due_date());
        assert!(DateFixtures::before_due() < DateFixtures::due_date());
    }
}
