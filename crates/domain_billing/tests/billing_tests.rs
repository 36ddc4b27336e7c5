//! Comprehensive tests for domain_billing
//!
//! Covers the full document lifecycle: totals rounding, quotation and
//! invoice state machines, quotation-to-invoice conversion, and the payment
//! ledger recomputation.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{ClientId, Currency, Money, TaxRate};
use domain_client::ContactSnapshot;

use domain_billing::invoice::{Invoice, InvoiceStatus};
use domain_billing::ledger;
use domain_billing::line_item::LineItem;
use domain_billing::payment::{Payment, PaymentMethod};
use domain_billing::quotation::{Quotation, QuotationStatus};
use domain_billing::totals::{recompute, DocumentTotals};
use domain_billing::BillingError;

fn contact() -> ContactSnapshot {
    ContactSnapshot {
        name: "Acme Studio".to_string(),
        email: "billing@acme.example".to_string(),
        phone: Some("+27 21 555 0100".to_string()),
        address: Some("1 Long Street, Cape Town".to_string()),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn vat() -> TaxRate {
    TaxRate::from_percentage(dec!(15)).unwrap()
}

fn draft_quotation() -> Quotation {
    Quotation::new(
        "QT-2025-000001".to_string(),
        ClientId::new(),
        contact(),
        date(2025, 3, 1),
        date(2025, 3, 31),
        vat(),
        Currency::ZAR,
    )
}

fn sent_invoice_of(total: &str) -> Invoice {
    let mut inv = Invoice::new(
        "INV-2025-000001".to_string(),
        ClientId::new(),
        contact(),
        date(2025, 3, 1),
        date(2025, 3, 31),
        TaxRate::zero(),
        Currency::ZAR,
    );
    inv.add_item(LineItem::new("Retainer", dec!(1), total.parse().unwrap()).unwrap())
        .unwrap();
    inv.send();
    inv
}

fn payment_of(inv: &Invoice, amount: &str, number: &str) -> Payment {
    Payment::new(
        number.to_string(),
        inv.id,
        inv.client_ref,
        Money::new(amount.parse().unwrap(), Currency::ZAR),
        date(2025, 3, 15),
        PaymentMethod::BankTransfer,
    )
    .unwrap()
}

// ============================================================================
// Totals aggregation
// ============================================================================

mod totals_tests {
    use super::*;

    #[test]
    fn test_rounding_contract_worked_example() {
        let items = vec![
            LineItem::new("Hosting", dec!(2), dec!(10.005)).unwrap(),
            LineItem::new("Licence", dec!(1), dec!(5.004)).unwrap(),
        ];
        let totals = recompute(&items, vat(), Currency::ZAR).unwrap();

        assert_eq!(totals.subtotal.amount(), dec!(25.01));
        assert_eq!(totals.tax_amount.amount(), dec!(3.75));
        assert_eq!(totals.total_amount.amount(), dec!(28.76));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let items = vec![LineItem::new("Work", dec!(3), dec!(33.335)).unwrap()];

        let first = recompute(&items, vat(), Currency::ZAR).unwrap();
        let second = recompute(&items, vat(), Currency::ZAR).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_document_has_zero_totals() {
        let totals = recompute(&[], vat(), Currency::ZAR).unwrap();
        assert_eq!(totals, DocumentTotals::zero(Currency::ZAR));
    }

    #[test]
    fn test_item_edit_keeps_document_consistent() {
        let mut q = draft_quotation();
        let item = LineItem::new("Design", dec!(2), dec!(100)).unwrap();
        let item_id = item.id;
        q.add_item(item).unwrap();
        assert_eq!(q.total_amount.amount(), dec!(230.00));

        q.update_item(
            LineItem {
                id: item_id,
                description: "Design".to_string(),
                quantity: dec!(1),
                unit_price: dec!(100),
                position: 0,
            },
        )
        .unwrap();
        assert_eq!(q.subtotal.amount(), dec!(100.00));
        assert_eq!(q.total_amount.amount(), dec!(115.00));

        q.remove_item(item_id).unwrap();
        assert!(q.total_amount.is_zero());
    }
}

// ============================================================================
// Quotation lifecycle
// ============================================================================

mod quotation_tests {
    use super::*;

    #[test]
    fn test_full_lifecycle_to_invoiced() {
        let mut q = draft_quotation();
        q.add_item(LineItem::new("Design", dec!(1), dec!(500)).unwrap())
            .unwrap();

        q.send();
        assert_eq!(q.status, QuotationStatus::Sent);
        q.accept().unwrap();
        assert_eq!(q.status, QuotationStatus::Accepted);
        q.mark_invoiced().unwrap();
        assert_eq!(q.status, QuotationStatus::Invoiced);
        assert!(q.status.is_terminal());
    }

    #[test]
    fn test_send_beyond_draft_is_noop() {
        let mut q = draft_quotation();
        q.send();
        q.reject().unwrap();
        q.send();
        assert_eq!(q.status, QuotationStatus::Rejected);
    }

    #[test]
    fn test_cannot_decide_a_draft() {
        let mut q = draft_quotation();
        assert!(q.accept().is_err());
        assert!(q.reject().is_err());
    }

    #[test]
    fn test_conversion_rejected_without_items() {
        let mut q = draft_quotation();
        q.send();
        q.accept().unwrap();

        assert!(matches!(q.mark_invoiced(), Err(BillingError::NoLineItems(_))));
        // Still accepted, not corrupted
        assert_eq!(q.status, QuotationStatus::Accepted);
    }
}

// ============================================================================
// Quotation -> Invoice conversion
// ============================================================================

mod conversion_tests {
    use super::*;

    #[test]
    fn test_conversion_clones_items_with_fresh_ids() {
        let mut q = draft_quotation();
        q.add_item(LineItem::new("Design", dec!(2), dec!(10.005)).unwrap())
            .unwrap();
        q.add_item(LineItem::new("Licence", dec!(1), dec!(5.004)).unwrap())
            .unwrap();
        q.send();
        q.accept().unwrap();
        let source_ids: Vec<_> = q.items.iter().map(|i| i.id).collect();

        let inv = Invoice::from_quotation(
            &mut q,
            "INV-2025-000009".to_string(),
            date(2025, 4, 1),
            date(2025, 4, 30),
        )
        .unwrap();

        assert_eq!(q.status, QuotationStatus::Invoiced);
        assert_eq!(inv.status, InvoiceStatus::Draft);
        assert_eq!(inv.quotation_ref, Some(q.id));
        assert_eq!(inv.items.len(), q.items.len());
        assert!(inv.items.iter().all(|i| !source_ids.contains(&i.id)));
        // Totals recomputed on the clone match the source contract
        assert_eq!(inv.subtotal.amount(), dec!(25.01));
        assert_eq!(inv.tax_amount.amount(), dec!(3.75));
        assert_eq!(inv.total_amount.amount(), dec!(28.76));
    }

    #[test]
    fn test_conversion_requires_accepted_status() {
        let mut q = draft_quotation();
        q.add_item(LineItem::new("Design", dec!(1), dec!(100)).unwrap())
            .unwrap();
        q.send();

        let result = Invoice::from_quotation(
            &mut q,
            "INV-2025-000010".to_string(),
            date(2025, 4, 1),
            date(2025, 4, 30),
        );
        assert!(matches!(
            result,
            Err(BillingError::InvalidStateTransition { .. })
        ));
        assert_eq!(q.status, QuotationStatus::Sent);
    }

    #[test]
    fn test_conversion_freezes_contact_snapshot() {
        let mut q = draft_quotation();
        q.add_item(LineItem::new("Design", dec!(1), dec!(100)).unwrap())
            .unwrap();
        q.send();
        q.accept().unwrap();

        let inv = Invoice::from_quotation(
            &mut q,
            "INV-2025-000011".to_string(),
            date(2025, 4, 1),
            date(2025, 4, 30),
        )
        .unwrap();

        assert_eq!(inv.contact.name, "Acme Studio");
        assert_eq!(inv.contact.email, "billing@acme.example");
    }
}

// ============================================================================
// Payment ledger
// ============================================================================

mod ledger_tests {
    use super::*;

    #[test]
    fn test_full_payment_settles_invoice() {
        let mut inv = sent_invoice_of("100.00");
        let p = payment_of(&inv, "100.00", "PAY-2025-0001");

        let outcome = ledger::apply_payment(&mut inv, &[], &p, date(2025, 3, 20)).unwrap();

        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(outcome.amount_paid.amount(), dec!(100.00));
        assert_eq!(outcome.amount_due.amount(), dec!(0.00));
    }

    #[test]
    fn test_partial_payments_accumulate() {
        let mut inv = sent_invoice_of("100.00");

        let first = payment_of(&inv, "40.00", "PAY-2025-0001");
        let outcome = ledger::apply_payment(&mut inv, &[], &first, date(2025, 3, 20)).unwrap();
        assert_eq!(inv.status, InvoiceStatus::PartiallyPaid);
        assert_eq!(outcome.amount_due.amount(), dec!(60.00));

        let second = payment_of(&inv, "60.00", "PAY-2025-0002");
        let outcome =
            ledger::apply_payment(&mut inv, &[first], &second, date(2025, 3, 25)).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(outcome.amount_due.amount(), dec!(0.00));
    }

    #[test]
    fn test_deleting_sole_payment_reverts_by_due_date() {
        // Before the due date the invoice falls back to sent
        let mut inv = sent_invoice_of("100.00");
        let p = payment_of(&inv, "100.00", "PAY-2025-0001");
        ledger::apply_payment(&mut inv, &[], &p, date(2025, 3, 20)).unwrap();

        ledger::remove_payment(&mut inv, &[], date(2025, 3, 25)).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Sent);
        assert_eq!(inv.amount_paid.amount(), dec!(0.00));

        // Past the due date it falls back to overdue instead
        let mut inv = sent_invoice_of("100.00");
        let p = payment_of(&inv, "100.00", "PAY-2025-0001");
        ledger::apply_payment(&mut inv, &[], &p, date(2025, 3, 20)).unwrap();

        ledger::remove_payment(&mut inv, &[], date(2025, 4, 10)).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Overdue);
    }

    #[test]
    fn test_overdue_forced_on_status_check() {
        let mut inv = sent_invoice_of("100.00");

        assert!(inv.is_overdue(date(2025, 4, 1)));
        assert!(inv.refresh_overdue(date(2025, 4, 1)));
        assert_eq!(inv.status, InvoiceStatus::Overdue);
    }

    #[test]
    fn test_overpayment_warns_but_succeeds() {
        let mut inv = sent_invoice_of("100.00");
        let p = payment_of(&inv, "120.00", "PAY-2025-0001");

        let outcome = ledger::apply_payment(&mut inv, &[], &p, date(2025, 3, 20)).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(outcome.overpaid_by.unwrap().amount(), dec!(20.00));
    }

    #[test]
    fn test_zero_amount_payment_never_constructs() {
        let inv = sent_invoice_of("100.00");
        let result = Payment::new(
            "PAY-2025-0001".to_string(),
            inv.id,
            inv.client_ref,
            Money::zero(Currency::ZAR),
            date(2025, 3, 15),
            PaymentMethod::Cash,
        );
        assert!(matches!(result, Err(BillingError::NonPositivePayment(_))));
    }

    #[test]
    fn test_recompute_from_scratch_matches_incremental() {
        let mut incremental = sent_invoice_of("100.00");
        let p1 = payment_of(&incremental, "30.00", "PAY-2025-0001");
        let p2 = payment_of(&incremental, "45.00", "PAY-2025-0002");
        ledger::apply_payment(&mut incremental, &[], &p1, date(2025, 3, 20)).unwrap();
        ledger::apply_payment(&mut incremental, &[p1.clone()], &p2, date(2025, 3, 21)).unwrap();

        let mut scratch = incremental.clone();
        let outcome =
            ledger::recompute_payment_status(&mut scratch, &[p1, p2], date(2025, 3, 21)).unwrap();

        assert_eq!(scratch.status, incremental.status);
        assert_eq!(outcome.amount_paid, incremental.amount_paid);
    }
}
