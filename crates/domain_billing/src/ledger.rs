//! Payment ledger recomputation
//!
//! `amount_paid` and the payment-driven portion of invoice status are never
//! edited directly; every payment application and removal funnels through
//! [`recompute_payment_status`], which rebuilds both from the full payment
//! list:
//!
//! 1. `amount_paid = sum(payments)`
//! 2. `amount_due = total_amount - amount_paid`
//! 3. `paid` when the balance is covered, `partially_paid` when anything has
//!    been received; a removal that drops `amount_paid` to zero reverts a
//!    paying invoice to `overdue` (when past due) or `sent`
//! 4. overdue override: past-due invoices that are not `paid`/`cancelled`
//!    are forced to `overdue`
//!
//! The repository runs these functions inside a transaction holding a row
//! lock on the invoice, so concurrent payments serialize.

use chrono::NaiveDate;
use tracing::warn;

use crate::error::BillingError;
use crate::invoice::{Invoice, InvoiceStatus};
use crate::payment::Payment;
use core_kernel::Money;

/// The result of a ledger recomputation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerOutcome {
    /// Status before the recomputation
    pub previous_status: InvoiceStatus,
    /// Status after the recomputation
    pub status: InvoiceStatus,
    /// Sum of all payments on the invoice
    pub amount_paid: Money,
    /// Outstanding balance (negative when overpaid)
    pub amount_due: Money,
    /// How far payments exceed the total, when they do
    pub overpaid_by: Option<Money>,
}

impl LedgerOutcome {
    /// True when the recomputation changed the invoice status
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.status
    }
}

/// Applies a new payment to an invoice and recomputes its status.
///
/// `prior_payments` are the payments already recorded against the invoice;
/// the new payment is validated (it must target this invoice and carry its
/// currency) and included in the sum.
///
/// # Errors
///
/// Rejects payments against draft, cancelled, or deleted invoices, and
/// payments whose invoice reference or currency does not match.
pub fn apply_payment(
    invoice: &mut Invoice,
    prior_payments: &[Payment],
    payment: &Payment,
    today: NaiveDate,
) -> Result<LedgerOutcome, BillingError> {
    ensure_payable(invoice)?;
    if payment.invoice_ref != invoice.id {
        return Err(BillingError::Validation(format!(
            "Payment {} targets a different invoice",
            payment.payment_number
        )));
    }

    let prior = sum_payments(invoice, prior_payments)?;
    let amount_paid = prior.checked_add(&payment.amount)?;

    recompute_with_amount(invoice, amount_paid, today)
}

/// Recomputes invoice status after a payment was deleted.
///
/// `remaining_payments` is the payment list with the deleted record already
/// excluded. Deleting a payment never deletes the invoice.
pub fn remove_payment(
    invoice: &mut Invoice,
    remaining_payments: &[Payment],
    today: NaiveDate,
) -> Result<LedgerOutcome, BillingError> {
    let amount_paid = sum_payments(invoice, remaining_payments)?;
    recompute_with_amount(invoice, amount_paid, today)
}

/// Recomputes `amount_paid`, `amount_due`, and status from the full payment
/// list. Safe to call repeatedly; it always derives from scratch.
pub fn recompute_payment_status(
    invoice: &mut Invoice,
    payments: &[Payment],
    today: NaiveDate,
) -> Result<LedgerOutcome, BillingError> {
    let amount_paid = sum_payments(invoice, payments)?;
    recompute_with_amount(invoice, amount_paid, today)
}

fn recompute_with_amount(
    invoice: &mut Invoice,
    amount_paid: Money,
    today: NaiveDate,
) -> Result<LedgerOutcome, BillingError> {
    let previous_status = invoice.status;
    invoice.amount_paid = amount_paid;

    if invoice.status != InvoiceStatus::Cancelled {
        let covered = amount_paid >= invoice.total_amount && amount_paid.is_positive();

        if covered {
            invoice.status = InvoiceStatus::Paid;
        } else if amount_paid.is_positive() {
            invoice.status = InvoiceStatus::PartiallyPaid;
        } else if matches!(
            previous_status,
            InvoiceStatus::Paid | InvoiceStatus::PartiallyPaid
        ) {
            // All payments removed: fall back to the pre-payment lifecycle
            invoice.status = InvoiceStatus::Sent;
        }

        invoice.refresh_overdue(today);
    }

    let amount_due = invoice.total_amount.checked_sub(&amount_paid)?;
    let overpaid_by = if amount_due.is_negative() {
        let excess = -amount_due;
        warn!(
            invoice = %invoice.invoice_number,
            overpaid_by = %excess,
            "Invoice is overpaid"
        );
        Some(excess)
    } else {
        None
    };

    invoice.updated_at = chrono::Utc::now();

    Ok(LedgerOutcome {
        previous_status,
        status: invoice.status,
        amount_paid,
        amount_due,
        overpaid_by,
    })
}

fn sum_payments(invoice: &Invoice, payments: &[Payment]) -> Result<Money, BillingError> {
    let mut total = Money::zero(invoice.currency);
    for payment in payments.iter().filter(|p| p.invoice_ref == invoice.id) {
        total = total.checked_add(&payment.amount)?;
    }
    Ok(total)
}

fn ensure_payable(invoice: &Invoice) -> Result<(), BillingError> {
    if invoice.is_deleted() {
        return Err(BillingError::InvoiceNotFound(invoice.id.to_string()));
    }
    match invoice.status {
        InvoiceStatus::Draft | InvoiceStatus::Cancelled => Err(
            BillingError::PaymentNotAccepted(invoice.status.to_string()),
        ),
        _ => Ok(()),
    }
}
