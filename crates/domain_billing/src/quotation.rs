//! Quotation document entity
//!
//! A quotation moves through `draft -> sent -> accepted | rejected`, and an
//! accepted quotation becomes `invoiced` when converted. `rejected` and
//! `invoiced` are terminal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BillingError;
use crate::line_item::LineItem;
use crate::totals;
use core_kernel::{ClientId, Currency, LineItemId, Money, QuotationId, TaxRate};
use domain_client::ContactSnapshot;

/// Quotation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    /// Being drafted, not yet visible to the client
    Draft,
    /// Sent to the client, awaiting a decision
    Sent,
    /// Accepted by the client, eligible for conversion
    Accepted,
    /// Rejected by the client (terminal)
    Rejected,
    /// Converted into an invoice (terminal)
    Invoiced,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "draft",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Accepted => "accepted",
            QuotationStatus::Rejected => "rejected",
            QuotationStatus::Invoiced => "invoiced",
        }
    }

    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuotationStatus::Rejected | QuotationStatus::Invoiced)
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuotationStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuotationStatus::Draft),
            "sent" => Ok(QuotationStatus::Sent),
            "accepted" => Ok(QuotationStatus::Accepted),
            "rejected" => Ok(QuotationStatus::Rejected),
            "invoiced" => Ok(QuotationStatus::Invoiced),
            other => Err(BillingError::Validation(format!(
                "Unknown quotation status: {other}"
            ))),
        }
    }
}

/// A quotation offered to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    /// Unique identifier
    pub id: QuotationId,
    /// Human-readable number, immutable once persisted
    pub quotation_number: String,
    /// The client this quotation is for
    pub client_ref: ClientId,
    /// Contact details frozen at creation time
    pub contact: ContactSnapshot,
    /// Date the quotation was issued
    pub issue_date: NaiveDate,
    /// Date the offer expires
    pub expiry_date: NaiveDate,
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
    /// Current status
    pub status: QuotationStatus,
    /// Free-form notes shown on the document
    pub notes: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Quotation {
    /// Creates a new draft quotation
    pub fn new(
        quotation_number: String,
        client_ref: ClientId,
        contact: ContactSnapshot,
        issue_date: NaiveDate,
        expiry_date: NaiveDate,
        tax_rate: TaxRate,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: QuotationId::new_v7(),
            quotation_number,
            client_ref,
            contact,
            issue_date,
            expiry_date,
            currency,
            tax_rate,
            items: Vec::new(),
            subtotal: Money::zero(currency),
            tax_amount: Money::zero(currency),
            total_amount: Money::zero(currency),
            status: QuotationStatus::Draft,
            notes: None,
            created_at: now,
            updated_at: now,
        }
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

    /// Marks the quotation as sent.
    ///
    /// Idempotent beyond draft: sending an already-sent (or decided)
    /// quotation is a no-op so a re-send of the email never corrupts status.
    pub fn send(&mut self) {
        if self.status == QuotationStatus::Draft {
            self.status = QuotationStatus::Sent;
            self.updated_at = Utc::now();
        }
    }

    /// Records the client's acceptance
    pub fn accept(&mut self) -> Result<(), BillingError> {
        self.transition(QuotationStatus::Sent, QuotationStatus::Accepted)
    }

    /// Records the client's rejection
    pub fn reject(&mut self) -> Result<(), BillingError> {
        self.transition(QuotationStatus::Sent, QuotationStatus::Rejected)
    }

    /// Marks the quotation as converted into an invoice.
    ///
    /// # Errors
    ///
    /// Requires `accepted` status and at least one line item.
    pub fn mark_invoiced(&mut self) -> Result<(), BillingError> {
        if self.items.is_empty() {
            return Err(BillingError::NoLineItems(self.quotation_number.clone()));
        }
        self.transition(QuotationStatus::Accepted, QuotationStatus::Invoiced)
    }

    fn transition(
        &mut self,
        expected: QuotationStatus,
        to: QuotationStatus,
    ) -> Result<(), BillingError> {
        if self.status != expected {
            return Err(BillingError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Line items can change while the quotation is still negotiable
    fn ensure_editable(&self) -> Result<(), BillingError> {
        match self.status {
            QuotationStatus::Draft | QuotationStatus::Sent => Ok(()),
            other => Err(BillingError::Validation(format!(
                "Cannot edit line items of a {other} quotation"
            ))),
        }
    }

    fn recompute_totals(&mut self) -> Result<(), BillingError> {
        let totals = totals::recompute(&self.items, self.tax_rate, self.currency)?;
        self.subtotal = totals.subtotal;
        self.tax_amount = totals.tax_amount;
        self.total_amount = totals.total_amount;
        self.updated_at = Utc::now();
        Ok(())
    }
}
