//! Integration Tests for the Billing Engine
//!
//! These tests verify cross-domain workflows and end-to-end scenarios
//! that involve multiple crates working together.

use chrono::NaiveDate;
use core_kernel::{next_payment_number, Currency, Money};
use rust_decimal_macros::dec;

use test_utils::{
    assert_invoice_status, assert_totals_consistent, line_item, ContactFixtures, DateFixtures,
    InvoiceBuilder, QuotationBuilder,
};

mod quotation_to_invoice_workflow {
    use super::*;
    use domain_billing::{Invoice, InvoiceStatus, QuotationStatus};

    /// Walks a quotation through its full lifecycle into an invoice
    #[test]
    fn test_quotation_lifecycle_to_invoice() {
        let mut quotation = QuotationBuilder::new()
            .with_items(vec![
                line_item("Brand identity package", dec!(1), dec!(45000.00), 0),
                line_item("Additional revisions", dec!(3), dec!(1500.00), 1),
            ])
            .build();

        assert_eq!(quotation.status, QuotationStatus::Draft);

        quotation.send();
        assert_eq!(quotation.status, QuotationStatus::Sent);

        quotation.accept().expect("sent quotation should accept");
        assert_eq!(quotation.status, QuotationStatus::Accepted);

        let invoice = Invoice::from_quotation(
            &mut quotation,
            "INV-2025-000042".to_string(),
            DateFixtures::issue_date(),
            DateFixtures::due_date(),
        )
        .expect("accepted quotation should convert");

        assert_eq!(quotation.status, QuotationStatus::Invoiced);
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.quotation_ref, Some(quotation.id));
        assert_eq!(invoice.items.len(), 2);

        // Cloned items carry fresh identities
        for (original, cloned) in quotation.items.iter().zip(invoice.items.iter()) {
            assert_ne!(original.id, cloned.id);
            assert_eq!(original.description, cloned.description);
        }

        // Totals carry over because the same raw inputs are recomputed
        assert_eq!(invoice.total_amount, quotation.total_amount);
        assert_totals_consistent(&invoice);
    }

    /// A rejected quotation is terminal and cannot convert
    #[test]
    fn test_rejected_quotation_cannot_convert() {
        let mut quotation = QuotationBuilder::new().build_sent();
        quotation.reject().expect("sent quotation should reject");

        let result = Invoice::from_quotation(
            &mut quotation,
            "INV-2025-000043".to_string(),
            DateFixtures::issue_date(),
            DateFixtures::due_date(),
        );
        assert!(result.is_err());
        assert_eq!(quotation.status, QuotationStatus::Rejected);
    }

    /// The contact snapshot on the invoice stays frozen even though the
    /// client record may change after conversion
    #[test]
    fn test_contact_snapshot_frozen_on_conversion() {
        let mut quotation = QuotationBuilder::new()
            .with_contact(ContactFixtures::acme())
            .build_accepted();

        let invoice = Invoice::from_quotation(
            &mut quotation,
            "INV-2025-000044".to_string(),
            DateFixtures::issue_date(),
            DateFixtures::due_date(),
        )
        .unwrap();

        assert_eq!(invoice.contact, ContactFixtures::acme());
    }
}

mod payment_workflow {
    use super::*;
    use domain_billing::{ledger, InvoiceStatus, Payment, PaymentMethod};

    fn payment(invoice: &domain_billing::Invoice, sequence: u32, amount: Money) -> Payment {
        Payment::new(
            next_payment_number(2025, sequence - 1).unwrap(),
            invoice.id,
            invoice.client_ref,
            amount,
            DateFixtures::before_due(),
            PaymentMethod::BankTransfer,
        )
        .expect("positive test payment")
    }

    /// Partial then full payment drives the invoice to `paid`
    #[test]
    fn test_partial_then_full_payment() {
        let mut invoice = InvoiceBuilder::new()
            .with_items(vec![line_item("Retainer", dec!(1), dec!(10000.00), 0)])
            .build_sent();
        let total = invoice.total_amount;

        let first = payment(&invoice, 1, Money::new(dec!(4000.00), Currency::ZAR));
        let outcome = ledger::apply_payment(&mut invoice, &[], &first, DateFixtures::before_due())
            .expect("payment should apply");
        assert_eq!(outcome.status, InvoiceStatus::PartiallyPaid);
        assert!(outcome.amount_due.is_positive());

        let remainder = total - first.amount;
        let second = payment(&invoice, 2, remainder);
        let outcome = ledger::apply_payment(
            &mut invoice,
            &[first.clone()],
            &second,
            DateFixtures::before_due(),
        )
        .expect("payment should apply");

        assert_eq!(outcome.status, InvoiceStatus::Paid);
        assert!(outcome.amount_due.is_zero());
        assert_invoice_status(&invoice, InvoiceStatus::Paid);
    }

    /// Deleting the covering payment reverts a paid invoice, straight to
    /// overdue when past due
    #[test]
    fn test_payment_removal_reverts_status_by_due_date() {
        let mut invoice = InvoiceBuilder::new().build_sent();
        let covering = payment(&invoice, 1, invoice.total_amount);

        ledger::apply_payment(&mut invoice, &[], &covering, DateFixtures::before_due()).unwrap();
        assert_invoice_status(&invoice, InvoiceStatus::Paid);

        // Remove it while still before the due date
        let outcome =
            ledger::remove_payment(&mut invoice, &[], DateFixtures::before_due()).unwrap();
        assert_eq!(outcome.status, InvoiceStatus::Sent);

        // Pay again, then remove after the due date has passed
        ledger::apply_payment(&mut invoice, &[], &covering, DateFixtures::before_due()).unwrap();
        let outcome = ledger::remove_payment(&mut invoice, &[], DateFixtures::past_due()).unwrap();
        assert_eq!(outcome.status, InvoiceStatus::Overdue);
    }

    /// Overpayment is accepted and surfaced, never rejected
    #[test]
    fn test_overpayment_is_flagged() {
        let mut invoice = InvoiceBuilder::new()
            .with_items(vec![line_item("Workshop", dec!(1), dec!(1000.00), 0)])
            .build_sent();

        let excessive = payment(
            &invoice,
            1,
            invoice.total_amount + Money::new(dec!(50.00), Currency::ZAR),
        );
        let outcome =
            ledger::apply_payment(&mut invoice, &[], &excessive, DateFixtures::before_due())
                .unwrap();

        assert_eq!(outcome.status, InvoiceStatus::Paid);
        let overpaid = outcome.overpaid_by.expect("overpayment should be flagged");
        assert_eq!(overpaid.amount(), dec!(50.00));
    }

    /// Payment numbers are sequential within a year
    #[test]
    fn test_payment_numbers_are_sequential() {
        assert_eq!(next_payment_number(2025, 0).unwrap(), "PAY-2025-0001");
        assert_eq!(next_payment_number(2025, 41).unwrap(), "PAY-2025-0042");
        assert!(next_payment_number(2025, 9999).is_err());
    }
}

mod overdue_workflow {
    use super::*;
    use domain_billing::InvoiceStatus;

    /// Overdue is derived from the injected date, not wall-clock time
    #[test]
    fn test_overdue_is_date_driven() {
        let mut invoice = InvoiceBuilder::new()
            .with_due_date(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap())
            .build_sent();

        assert!(!invoice.refresh_overdue(DateFixtures::due_date()));
        assert_invoice_status(&invoice, InvoiceStatus::Sent);

        assert!(invoice.refresh_overdue(DateFixtures::past_due()));
        assert_invoice_status(&invoice, InvoiceStatus::Overdue);

        // Refreshing again is a no-op
        assert!(!invoice.refresh_overdue(DateFixtures::past_due()));
    }

    /// Draft invoices never go overdue; issuing them starts the clock
    #[test]
    fn test_draft_invoices_never_overdue() {
        let mut invoice = InvoiceBuilder::new()
            .with_due_date(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap())
            .build();

        assert!(!invoice.refresh_overdue(DateFixtures::past_due()));
        assert_invoice_status(&invoice, InvoiceStatus::Draft);

        invoice.send();
        assert!(invoice.refresh_overdue(DateFixtures::past_due()));
    }
}

mod rounding_workflow {
    use super::*;
    use test_utils::TaxFixtures;

    /// The worked example: fractional unit prices keep full precision until
    /// each rounding stage
    #[test]
    fn test_stepwise_rounding_across_conversion() {
        let mut quotation = QuotationBuilder::new()
            .with_tax_rate(TaxFixtures::vat_15())
            .with_items(vec![
                line_item("Licence", dec!(2), dec!(10.005), 0),
                line_item("Surcharge", dec!(1), dec!(5.004), 1),
            ])
            .build_accepted();

        assert_eq!(quotation.subtotal.amount(), dec!(25.01));
        assert_eq!(quotation.tax_amount.amount(), dec!(3.75));
        assert_eq!(quotation.total_amount.amount(), dec!(28.76));

        let invoice = domain_billing::Invoice::from_quotation(
            &mut quotation,
            "INV-2025-000050".to_string(),
            DateFixtures::issue_date(),
            DateFixtures::due_date(),
        )
        .unwrap();

        // Conversion preserves raw inputs, so the recomputed totals match
        assert_eq!(invoice.subtotal.amount(), dec!(25.01));
        assert_eq!(invoice.total_amount.amount(), dec!(28.76));
    }
}
