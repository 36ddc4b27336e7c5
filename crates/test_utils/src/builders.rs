//! Test Data Builders
//!
//! Provides builder patterns for constructing test documents with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{ClientId, Currency, TaxRate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{ContactFixtures, DateFixtures, IdFixtures, TaxFixtures};
use domain_billing::{Invoice, LineItem, Quotation};
use domain_client::ContactSnapshot;

/// Builder for constructing test quotations
pub struct QuotationBuilder {
    quotation_number: String,
    client_ref: ClientId,
    contact: ContactSnapshot,
    issue_date: NaiveDate,
    expiry_date: NaiveDate,
    tax_rate: TaxRate,
    currency: Currency,
    items: Vec<LineItem>,
}

impl Default for QuotationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuotationBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            quotation_number: "QT-2025-000001".to_string(),
            client_ref: IdFixtures::client_id(),
            contact: ContactFixtures::acme(),
            issue_date: DateFixtures::issue_date(),
            expiry_date: DateFixtures::expiry_date(),
            tax_rate: TaxFixtures::vat_15(),
            currency: Currency::ZAR,
            items: vec![line_item("Design retainer", dec!(1), dec!(10000.00), 0)],
        }
    }

    /// Sets the quotation number
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.quotation_number = number.into();
        self
    }

    /// Sets the client reference
    pub fn with_client(mut self, id: ClientId) -> Self {
        self.client_ref = id;
        self
    }

    /// Sets the contact snapshot
    pub fn with_contact(mut self, contact: ContactSnapshot) -> Self {
        self.contact = contact;
        self
    }

    /// Sets the issue date
    pub fn with_issue_date(mut self, date: NaiveDate) -> Self {
        self.issue_date = date;
        self
    }

    /// Sets the expiry date
    pub fn with_expiry_date(mut self, date: NaiveDate) -> Self {
        self.expiry_date = date;
        self
    }

    /// Sets the tax rate
    pub fn with_tax_rate(mut self, rate: TaxRate) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Sets the currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Replaces the line items
    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }

    /// Removes all line items
    pub fn without_items(mut self) -> Self {
        self.items.clear();
        self
    }

    /// Builds a draft quotation
    pub fn build(self) -> Quotation {
        let mut quotation = Quotation::new(
            self.quotation_number,
            self.client_ref,
            self.contact,
            self.issue_date,
            self.expiry_date,
            self.tax_rate,
            self.currency,
        );
        if !self.items.is_empty() {
            quotation.set_items(self.items).expect("draft quotations are editable");
        }
        quotation
    }

    /// Builds a quotation already in the `sent` state
    pub fn build_sent(self) -> Quotation {
        let mut quotation = self.build();
        quotation.send();
        quotation
    }

    /// Builds a quotation already in the `accepted` state
    pub fn build_accepted(self) -> Quotation {
        let mut quotation = self.build_sent();
        quotation.accept().expect("sent quotations can be accepted");
        quotation
    }
}

/// Builder for constructing test invoices
pub struct InvoiceBuilder {
    invoice_number: String,
    client_ref: ClientId,
    contact: ContactSnapshot,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    tax_rate: TaxRate,
    currency: Currency,
    items: Vec<LineItem>,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            invoice_number: "INV-2025-000001".to_string(),
            client_ref: IdFixtures::client_id(),
            contact: ContactFixtures::acme(),
            issue_date: DateFixtures::issue_date(),
            due_date: DateFixtures::due_date(),
            tax_rate: TaxFixtures::vat_15(),
            currency: Currency::ZAR,
            items: vec![line_item("Design retainer", dec!(1), dec!(10000.00), 0)],
        }
    }

    /// Sets the invoice number
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = number.into();
        self
    }

    /// Sets the client reference
    pub fn with_client(mut self, id: ClientId) -> Self {
        self.client_ref = id;
        self
    }

    /// Sets the contact snapshot
    pub fn with_contact(mut self, contact: ContactSnapshot) -> Self {
        self.contact = contact;
        self
    }

    /// Sets the issue date
    pub fn with_issue_date(mut self, date: NaiveDate) -> Self {
        self.issue_date = date;
        self
    }

    /// Sets the due date
    pub fn with_due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = date;
        self
    }

    /// Sets the tax rate
    pub fn with_tax_rate(mut self, rate: TaxRate) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Sets the currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Replaces the line items
    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }

    /// Builds a draft invoice
    pub fn build(self) -> Invoice {
        let mut invoice = Invoice::new(
            self.invoice_number,
            self.client_ref,
            self.contact,
            self.issue_date,
            self.due_date,
            self.tax_rate,
            self.currency,
        );
        if !self.items.is_empty() {
            invoice.set_items(self.items).expect("draft invoices are editable");
        }
        invoice
    }

    /// Builds an invoice already in the `sent` state
    pub fn build_sent(self) -> Invoice {
        let mut invoice = self.build();
        invoice.send();
        invoice
    }
}

/// Creates a line item, panicking on invalid inputs (test-only)
pub fn line_item(
    description: &str,
    quantity: Decimal,
    unit_price: Decimal,
    position: u32,
) -> LineItem {
    LineItem::new(description, quantity, unit_price)
        .expect("test line item should be valid")
        .with_position(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_billing::{InvoiceStatus, QuotationStatus};

    #[test]
    fn test_quotation_builder_defaults() {
        let quotation = QuotationBuilder::new().build();
        assert_eq!(quotation.status, QuotationStatus::Draft);
        assert_eq!(quotation.items.len(), 1);
        assert!(quotation.total_amount.amount() > Decimal::ZERO);
    }

    #[test]
    fn test_quotation_builder_accepted() {
        let quotation = QuotationBuilder::new().build_accepted();
        assert_eq!(quotation.status, QuotationStatus::Accepted);
    }

    #[test]
    fn test_invoice_builder_sent() {
        let invoice = InvoiceBuilder::new()
            .with_items(vec![
                line_item("Hosting", dec!(12), dec!(250.00), 0),
                line_item("Support", dec!(4), dec!(800.00), 1),
            ])
            .build_sent();

        assert_eq!(invoice.status, InvoiceStatus::Sent);
        assert_eq!(invoice.items.len(), 2);
    }
}
