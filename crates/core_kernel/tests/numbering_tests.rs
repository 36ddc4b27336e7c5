//! Unit tests for document number generation
//!
//! Tests cover number formats, collision retry behavior, sequential
//! payment numbering, and pattern validation.

use core_kernel::{
    allocate_document_number, is_valid_document_number, is_valid_payment_number,
    next_payment_number, random_document_number, DocumentKind, NumberingError,
    MAX_ALLOCATION_ATTEMPTS,
};
use std::collections::HashSet;

mod generation {
    use super::*;

    #[test]
    fn test_invoice_numbers_use_inv_prefix() {
        let n = random_document_number(DocumentKind::Invoice, 2025);
        assert!(n.starts_with("INV-2025-"));
        assert_eq!(n.len(), "INV-2025-000000".len());
    }

    #[test]
    fn test_quotation_numbers_use_qt_prefix() {
        let n = random_document_number(DocumentKind::Quotation, 2025);
        assert!(n.starts_with("QT-2025-"));
    }

    #[test]
    fn test_suffix_is_zero_padded() {
        for _ in 0..200 {
            let n = random_document_number(DocumentKind::Invoice, 2025);
            let suffix = n.rsplit('-').next().unwrap();
            assert_eq!(suffix.len(), 6);
            assert!(suffix.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}

mod allocation {
    use super::*;

    #[test]
    fn test_allocation_returns_first_free_candidate() {
        let n = allocate_document_number(DocumentKind::Invoice, 2025, |_| false).unwrap();
        assert!(is_valid_document_number(DocumentKind::Invoice, &n));
    }

    #[test]
    fn test_allocation_rerolls_on_collision() {
        let mut issued: HashSet<String> = HashSet::new();
        for _ in 0..300 {
            let n = allocate_document_number(DocumentKind::Quotation, 2025, |c| {
                issued.contains(c)
            })
            .unwrap();
            assert!(issued.insert(n), "allocator handed out a taken number");
        }
    }

    #[test]
    fn test_allocation_is_bounded() {
        let mut checks = 0;
        let result = allocate_document_number(DocumentKind::Invoice, 2025, |_| {
            checks += 1;
            true
        });

        assert!(matches!(
            result,
            Err(NumberingError::AttemptsExhausted {
                kind: DocumentKind::Invoice,
                year: 2025,
                ..
            })
        ));
        assert_eq!(checks, MAX_ALLOCATION_ATTEMPTS);
    }
}

mod payment_sequence {
    use super::*;

    #[test]
    fn test_first_payment_of_the_year() {
        assert_eq!(next_payment_number(2025, 0).unwrap(), "PAY-2025-0001");
    }

    #[test]
    fn test_sequence_increments_from_last_issued() {
        assert_eq!(next_payment_number(2025, 122).unwrap(), "PAY-2025-0123");
    }

    #[test]
    fn test_sequence_resets_per_year() {
        // The caller supplies the last sequence for the target year, so a
        // new year naturally starts from zero.
        assert_eq!(next_payment_number(2026, 0).unwrap(), "PAY-2026-0001");
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert!(matches!(
            next_payment_number(2025, 9999),
            Err(NumberingError::SequenceOverflow { .. })
        ));
    }
}

mod validation {
    use super::*;

    #[test]
    fn test_valid_numbers_pass() {
        assert!(is_valid_document_number(DocumentKind::Invoice, "INV-2025-482913"));
        assert!(is_valid_document_number(DocumentKind::Quotation, "QT-2025-000001"));
        assert!(is_valid_payment_number("PAY-2025-0001"));
    }

    #[test]
    fn test_wrong_prefix_fails() {
        assert!(!is_valid_document_number(DocumentKind::Invoice, "QT-2025-482913"));
        assert!(!is_valid_payment_number("INV-2025-0001"));
    }

    #[test]
    fn test_wrong_suffix_length_fails() {
        assert!(!is_valid_document_number(DocumentKind::Invoice, "INV-2025-48291"));
        assert!(!is_valid_payment_number("PAY-2025-001"));
    }

    #[test]
    fn test_non_digit_segments_fail() {
        assert!(!is_valid_document_number(DocumentKind::Invoice, "INV-20X5-482913"));
        assert!(!is_valid_payment_number("PAY-2025-00A1"));
    }

    #[test]
    fn test_empty_and_garbage_fail() {
        assert!(!is_valid_document_number(DocumentKind::Invoice, ""));
        assert!(!is_valid_payment_number("PAY2025-0001"));
    }
}
