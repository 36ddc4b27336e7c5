//! Invoice document entity
//!
//! Structurally an invoice mirrors a quotation; the status vocabulary is
//! payment-driven instead of offer-driven. Payment application and removal
//! are handled by the ledger module, which writes `amount_paid` and status
//! through [`crate::ledger::recompute_payment_status`].
//!
//! Overdue is derived, not scheduled: callers evaluate it on read or via an
//! explicit status check with an injected `today`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BillingError;
use crate::line_item::LineItem;
use crate::quotation::Quotation;
use crate::totals;
use core_kernel::{ClientId, Currency, InvoiceId, LineItemId, Money, QuotationId, TaxRate};
use domain_client::ContactSnapshot;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted, not yet issued to the client
    Draft,
    /// Sent to the client, awaiting payment
    Sent,
    /// Some payment received, balance outstanding
    PartiallyPaid,
    /// Fully paid
    Paid,
    /// Past the due date with a balance outstanding
    Overdue,
    /// Cancelled (terminal)
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "partially_paid" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(BillingError::Validation(format!(
                "Unknown invoice status: {other}"
            ))),
        }
    }
}

/// An invoice issued to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Human-readable number, immutable once persisted
    pub invoice_number: String,
    /// Source quotation when created by conversion
    pub quotation_ref: Option<QuotationId>,
    /// The client being billed
    pub client_ref: ClientId,
    /// Contact details frozen at creation time
    pub contact: ContactSnapshot,
    /// Date the invoice was issued
    pub issue_date: NaiveDate,
    /// Date payment is due
    pub due_date: NaiveDate,
    /// Document currency
    pub currency: Currency,
    /// Tax rate applied to the subtotal
    pub tax_rate: TaxRate,
    /// Ordered line items, exclusively owned
    pub items: Vec<LineItem>,
    /// Derived: sum of line amounts
    pub subtotal: Money,
    /// Derived: tax on the subtotal
    pub tax_amount: Money,
    /// Derived: subtotal plus tax
    pub total_amount: Money,
    /// Sum of recorded payments, written by the ledger
    pub amount_paid: Money,
    /// Current status
    pub status: InvoiceStatus,
    /// Free-form notes shown on the document
    pub notes: Option<String>,
    /// Soft-delete marker; invoices are never hard-deleted
    pub deleted_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new draft invoice
    pub fn new(
        invoice_number: String,
        client_ref: ClientId,
        contact: ContactSnapshot,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        tax_rate: TaxRate,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            invoice_number,
            quotation_ref: None,
            client_ref,
            contact,
            issue_date,
            due_date,
            currency,
            tax_rate,
            items: Vec::new(),
            subtotal: Money::zero(currency),
            tax_amount: Money::zero(currency),
            total_amount: Money::zero(currency),
            amount_paid: Money::zero(currency),
            status: InvoiceStatus::Draft,
            notes: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Converts an accepted quotation into a draft invoice.
    ///
    /// Flips the quotation to `invoiced` and clones its line items (with
    /// fresh ids) and contact snapshot onto the new invoice. The repository
    /// persists both sides in one transaction.
    ///
    /// # Errors
    ///
    /// Fails when the quotation is not `accepted` or has no line items.
    pub fn from_quotation(
        quotation: &mut Quotation,
        invoice_number: String,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<Self, BillingError> {
        quotation.mark_invoiced()?;

        let mut invoice = Self::new(
            invoice_number,
            quotation.client_ref,
            quotation.contact.clone(),
            issue_date,
            due_date,
            quotation.tax_rate,
            quotation.currency,
        );
        invoice.quotation_ref = Some(quotation.id);
        invoice.items = quotation.items.iter().map(LineItem::duplicate).collect();
        invoice.notes = quotation.notes.clone();
        invoice.recompute_totals()?;

        Ok(invoice)
    }

    /// Adds a line item and recomputes totals
    pub fn add_item(&mut self, mut item: LineItem) -> Result<(), BillingError> {
        self.ensure_editable()?;
        item.position = self.items.len() as u32;
        self.items.push(item);
        self.recompute_totals()
    }

    /// Replaces an existing line item and recomputes totals
    pub fn update_item(&mut self, item: LineItem) -> Result<(), BillingError> {
        self.ensure_editable()?;
        let slot = self
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| BillingError::LineItemNotFound(item.id.to_string()))?;
        *slot = item;
        self.recompute_totals()
    }

    /// Removes a line item and recomputes totals
    pub fn remove_item(&mut self, item_id: LineItemId) -> Result<(), BillingError> {
        self.ensure_editable()?;
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() == before {
            return Err(BillingError::LineItemNotFound(item_id.to_string()));
        }
        self.recompute_totals()
    }

    /// Replaces the whole item list, renumbering positions
    pub fn set_items(&mut self, items: Vec<LineItem>) -> Result<(), BillingError> {
        self.ensure_editable()?;
        self.items = items;
        for (position, item) in self.items.iter_mut().enumerate() {
            item.position = position as u32;
        }
        self.recompute_totals()
    }

    /// Marks the invoice as sent. Idempotent beyond draft.
    pub fn send(&mut self) {
        if self.status == InvoiceStatus::Draft {
            self.status = InvoiceStatus::Sent;
            self.updated_at = Utc::now();
        }
    }

    /// Cancels the invoice.
    ///
    /// # Errors
    ///
    /// Paid and already-cancelled invoices cannot be cancelled.
    pub fn cancel(&mut self) -> Result<(), BillingError> {
        match self.status {
            InvoiceStatus::Paid | InvoiceStatus::Cancelled => {
                Err(BillingError::InvalidStateTransition {
                    from: self.status.to_string(),
                    to: InvoiceStatus::Cancelled.to_string(),
                })
            }
            _ => {
                self.status = InvoiceStatus::Cancelled;
                self.updated_at = Utc::now();
                Ok(())
            }
        }
    }

    /// The outstanding balance: `total_amount - amount_paid`.
    ///
    /// Negative when overpaid; overpayment is allowed and surfaced as a
    /// warning by the ledger, never blocked.
    pub fn amount_due(&self) -> Money {
        self.total_amount - self.amount_paid
    }

    /// Whether the invoice is past due with its status still payable
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date
            && !matches!(
                self.status,
                InvoiceStatus::Paid | InvoiceStatus::Cancelled | InvoiceStatus::Draft
            )
    }

    /// Forces `overdue` when past due. Returns true if the status changed.
    pub fn refresh_overdue(&mut self, today: NaiveDate) -> bool {
        if self.is_overdue(today) && self.status != InvoiceStatus::Overdue {
            self.status = InvoiceStatus::Overdue;
            self.updated_at = Utc::now();
            return true;
        }
        false
    }

    /// Returns true if the invoice has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Marks the invoice as deleted
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Line items can change until payment activity or cancellation
    fn ensure_editable(&self) -> Result<(), BillingError> {
        match self.status {
            InvoiceStatus::Draft | InvoiceStatus::Sent | InvoiceStatus::Overdue => Ok(()),
            other => Err(BillingError::Validation(format!(
                "Cannot edit line items of a {other} invoice"
            ))),
        }
    }

    pub(crate) fn recompute_totals(&mut self) -> Result<(), BillingError> {
        let totals = totals::recompute(&self.items, self.tax_rate, self.currency)?;
        self.subtotal = totals.subtotal;
        self.tax_amount = totals.tax_amount;
        self.total_amount = totals.total_amount;
        self.updated_at = Utc::now();
        Ok(())
    }
}
