//! Billing DTOs
//!
//! Responses expose amounts as plain decimals plus a currency code; totals
//! come straight off the domain entities, which recompute them from the raw
//! line item inputs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_billing::{Invoice, LedgerOutcome, Payment, Quotation};

#[derive(Debug, Deserialize)]
pub struct LineItemRequest {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateQuotationRequest {
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    /// Tax percentage, e.g. 15 for 15%
    pub tax_rate: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_id: Uuid,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub tax_rate: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemsRequest {
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuotationRequest {
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub invoice_id: Uuid,
    /// Defaults to the invoice's client when omitted
    pub client_id: Option<Uuid>,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    pub transaction_reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    pub id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Rounded line amount in the document currency
    pub amount: Decimal,
    pub position: u32,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuotationResponse {
    pub id: Uuid,
    pub quotation_number: String,
    pub client_id: Uuid,
    pub contact: ContactResponse,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub currency: String,
    pub tax_rate: Decimal,
    pub items: Vec<LineItemResponse>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub quotation_id: Option<Uuid>,
    pub client_id: Uuid,
    pub contact: ContactResponse,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: String,
    pub tax_rate: Decimal,
    pub items: Vec<LineItemResponse>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub payment_number: String,
    pub invoice_id: Uuid,
    pub client_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub payment_date: NaiveDate,
    pub method: String,
    pub transaction_reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a send request: the document plus whether delivery succeeded.
/// A failed delivery never reverts the status change.
#[derive(Debug, Serialize)]
pub struct SendQuotationResponse {
    pub quotation: QuotationResponse,
    pub delivered: bool,
}

#[derive(Debug, Serialize)]
pub struct SendInvoiceResponse {
    pub invoice: InvoiceResponse,
    pub delivered: bool,
}

/// Result of recording or deleting a payment
#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentResponse>,
    pub invoice_status: String,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overpaid_by: Option<Decimal>,
    /// Whether the receipt email went out; absent on payment deletion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_delivered: Option<bool>,
}

impl LedgerResponse {
    pub fn from_outcome(payment: Option<&Payment>, outcome: &LedgerOutcome) -> Self {
        Self {
            payment: payment.map(PaymentResponse::from),
            invoice_status: outcome.status.to_string(),
            amount_paid: outcome.amount_paid.amount(),
            amount_due: outcome.amount_due.amount(),
            overpaid_by: outcome.overpaid_by.map(|m| m.amount()),
            receipt_delivered: None,
        }
    }

    pub fn with_receipt(mut self, delivered: bool) -> Self {
        self.receipt_delivered = Some(delivered);
        self
    }
}

impl From<&Quotation> for QuotationResponse {
    fn from(quotation: &Quotation) -> Self {
        Self {
            id: *quotation.id.as_uuid(),
            quotation_number: quotation.quotation_number.clone(),
            client_id: *quotation.client_ref.as_uuid(),
            contact: ContactResponse {
                name: quotation.contact.name.clone(),
                email: quotation.contact.email.clone(),
                phone: quotation.contact.phone.clone(),
                address: quotation.contact.address.clone(),
            },
            issue_date: quotation.issue_date,
            expiry_date: quotation.expiry_date,
            currency: quotation.currency.code().to_string(),
            tax_rate: quotation.tax_rate.as_percentage(),
            items: quotation
                .items
                .iter()
                .map(|item| line_item_response(item, quotation.currency))
                .collect(),
            subtotal: quotation.subtotal.amount(),
            tax_amount: quotation.tax_amount.amount(),
            total_amount: quotation.total_amount.amount(),
            status: quotation.status.to_string(),
            notes: quotation.notes.clone(),
            created_at: quotation.created_at,
            updated_at: quotation.updated_at,
        }
    }
}

impl From<&Invoice> for InvoiceResponse {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: *invoice.id.as_uuid(),
            invoice_number: invoice.invoice_number.clone(),
            quotation_id: invoice.quotation_ref.map(|q| *q.as_uuid()),
            client_id: *invoice.client_ref.as_uuid(),
            contact: ContactResponse {
                name: invoice.contact.name.clone(),
                email: invoice.contact.email.clone(),
                phone: invoice.contact.phone.clone(),
                address: invoice.contact.address.clone(),
            },
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            currency: invoice.currency.code().to_string(),
            tax_rate: invoice.tax_rate.as_percentage(),
            items: invoice
                .items
                .iter()
                .map(|item| line_item_response(item, invoice.currency))
                .collect(),
            subtotal: invoice.subtotal.amount(),
            tax_amount: invoice.tax_amount.amount(),
            total_amount: invoice.total_amount.amount(),
            amount_paid: invoice.amount_paid.amount(),
            amount_due: invoice.amount_due().amount(),
            status: invoice.status.to_string(),
            notes: invoice.notes.clone(),
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            payment_number: payment.payment_number.clone(),
            invoice_id: *payment.invoice_ref.as_uuid(),
            client_id: *payment.client_ref.as_uuid(),
            amount: payment.amount.amount(),
            currency: payment.amount.currency().code().to_string(),
            payment_date: payment.payment_date,
            method: payment.method.to_string(),
            transaction_reference: payment.transaction_reference.clone(),
            notes: payment.notes.clone(),
            created_at: payment.created_at,
        }
    }
}

fn line_item_response(
    item: &domain_billing::LineItem,
    currency: core_kernel::Currency,
) -> LineItemResponse {
    LineItemResponse {
        id: *item.id.as_uuid(),
        description: item.description.clone(),
        quantity: item.quantity,
        unit_price: item.unit_price,
        amount: item.amount(currency).amount(),
        position: item.position,
    }
}
