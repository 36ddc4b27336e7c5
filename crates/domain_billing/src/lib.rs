//! Billing Domain - quotations, invoices, line items, and payments
//!
//! This crate implements the document lifecycle for the agency's billing:
//!
//! - **Quotations** move `draft -> sent -> accepted | rejected`, and an
//!   accepted quotation converts into a draft invoice (`invoiced`).
//! - **Invoices** move `draft -> sent` and from there are driven by the
//!   payment ledger: `partially_paid`, `paid`, `overdue`, `cancelled`.
//! - **Line items** are exclusively owned by their document; totals are
//!   recomputed from raw item inputs with half-up rounding at every stage.
//! - **Payments** are immutable records; applying or deleting one recomputes
//!   the invoice's `amount_paid` and status from the full payment list.
//!
//! Overdue is derived on read with an injected `today`, never by a
//! background scheduler.

pub mod error;
pub mod invoice;
pub mod ledger;
pub mod line_item;
pub mod payment;
pub mod quotation;
pub mod totals;

pub use error::BillingError;
pub use invoice::{Invoice, InvoiceStatus};
pub use ledger::{apply_payment, recompute_payment_status, remove_payment, LedgerOutcome};
pub use line_item::LineItem;
pub use payment::{Payment, PaymentMethod};
pub use quotation::{Quotation, QuotationStatus};
pub use totals::{recompute, DocumentTotals};
