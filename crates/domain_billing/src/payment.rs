//! Payment records
//!
//! A payment is an immutable record of money received against an invoice.
//! Payments are never edited after creation; correcting a mistake means
//! deleting the payment (which triggers a status recomputation) and
//! recording a new one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BillingError;
use core_kernel::{ClientId, InvoiceId, Money, PaymentId};

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Electronic funds transfer
    BankTransfer,
    /// Credit card
    CreditCard,
    /// Debit card
    DebitCard,
    /// Cash
    Cash,
    /// Cheque
    Cheque,
    /// Anything else (noted in the transaction reference)
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "cash" => Ok(PaymentMethod::Cash),
            "cheque" => Ok(PaymentMethod::Cheque),
            "other" => Ok(PaymentMethod::Other),
            other => Err(BillingError::Validation(format!(
                "Unknown payment method: {other}"
            ))),
        }
    }
}

/// A payment received against an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Human-readable number (`PAY-YYYY-NNNN`), immutable once persisted
    pub payment_number: String,
    /// Invoice being paid
    pub invoice_ref: InvoiceId,
    /// Paying client, defaulted from the invoice when not supplied
    pub client_ref: ClientId,
    /// Amount received, strictly positive
    pub amount: Money,
    /// Date the money was received
    pub payment_date: NaiveDate,
    /// How the payment was made
    pub method: PaymentMethod,
    /// External reference (bank ref, gateway transaction id)
    pub transaction_reference: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment record
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NonPositivePayment` when the amount is zero or
    /// negative; this is checked before any insertion.
    pub fn new(
        payment_number: String,
        invoice_ref: InvoiceId,
        client_ref: ClientId,
        amount: Money,
        payment_date: NaiveDate,
        method: PaymentMethod,
    ) -> Result<Self, BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::NonPositivePayment(amount.amount()));
        }

        Ok(Self {
            id: PaymentId::new_v7(),
            payment_number,
            invoice_ref,
            client_ref,
            amount,
            payment_date,
            method,
            transaction_reference: None,
            notes: None,
            created_at: Utc::now(),
        })
    }

    /// Sets the external transaction reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.transaction_reference = Some(reference.into());
        self
    }

    /// Sets free-form notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn payment(amount: Money) -> Result<Payment, BillingError> {
        Payment::new(
            "PAY-2025-0001".to_string(),
            InvoiceId::new(),
            ClientId::new(),
            amount,
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            PaymentMethod::BankTransfer,
        )
    }

    #[test]
    fn test_positive_amount_accepted() {
        let p = payment(Money::new(dec!(100.00), Currency::ZAR)).unwrap();
        assert_eq!(p.amount.amount(), dec!(100.00));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let result = payment(Money::zero(Currency::ZAR));
        assert!(matches!(result, Err(BillingError::NonPositivePayment(_))));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let result = payment(Money::new(dec!(-5.00), Currency::ZAR));
        assert!(matches!(result, Err(BillingError::NonPositivePayment(_))));
    }

    #[test]
    fn test_method_string_roundtrip() {
        for method in [
            PaymentMethod::BankTransfer,
            PaymentMethod::CreditCard,
            PaymentMethod::DebitCard,
            PaymentMethod::Cash,
            PaymentMethod::Cheque,
            PaymentMethod::Other,
        ] {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
    }
}
