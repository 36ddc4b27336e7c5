//! Billing domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::MoneyError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Invalid document status transition
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Document has no line items where at least one is required
    #[error("{0} has no line items")]
    NoLineItems(String),

    /// Line item not found on the document
    #[error("Line item not found: {0}")]
    LineItemNotFound(String),

    /// Payment amount must be strictly positive
    #[error("Payment amount must be positive, got {0}")]
    NonPositivePayment(Decimal),

    /// Payments cannot be applied in the document's current status
    #[error("Cannot record a payment against a {0} invoice")]
    PaymentNotAccepted(String),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Quotation not found
    #[error("Quotation not found: {0}")]
    QuotationNotFound(String),

    /// Payment not found
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Money arithmetic error
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}
