//! Core Kernel - Foundational types and utilities for the billing engine
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic and half-up rounding
//! - Document number generation and validation
//! - Common identifiers and value objects

pub mod error;
pub mod identifiers;
pub mod money;
pub mod numbering;

pub use error::CoreError;
pub use identifiers::{ClientId, InvoiceId, LineItemId, PaymentId, QuotationId};
pub use money::{round_money, Currency, Money, MoneyError, TaxRate};
pub use numbering::{
    allocate_document_number, is_valid_document_number, is_valid_payment_number,
    next_payment_number, random_document_number, DocumentKind, NumberingError,
    MAX_ALLOCATION_ATTEMPTS, MAX_PAYMENT_SEQUENCE,
};
