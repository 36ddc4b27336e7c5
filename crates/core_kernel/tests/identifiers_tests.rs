//! Unit tests for the Identifiers module
//!
//! Tests cover identifier creation, parsing, conversion, and display
//! formatting for each entity identifier type.

use core_kernel::{ClientId, InvoiceId, LineItemId, PaymentId, QuotationId};
use uuid::Uuid;

mod invoice_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = InvoiceId::new();
        let id2 = InvoiceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = InvoiceId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = InvoiceId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = InvoiceId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_display_format() {
        let id = InvoiceId::new();
        assert!(id.to_string().starts_with("INV-"));
    }

    #[test]
    fn test_from_str_with_prefix() {
        let original = InvoiceId::new();
        let parsed: InvoiceId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_from_str_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: InvoiceId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_json_serialization() {
        let id = InvoiceId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: InvoiceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}

mod quotation_id_tests {
    use super::*;

    #[test]
    fn test_prefix() {
        assert_eq!(QuotationId::prefix(), "QTN");
    }

    #[test]
    fn test_roundtrip() {
        let original = QuotationId::new();
        let parsed: QuotationId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }
}

mod cross_type_tests {
    use super::*;

    #[test]
    fn test_different_id_types_are_distinct() {
        // Same UUID yields different identifier types that cannot be mixed
        let uuid = Uuid::new_v4();
        let invoice_id = InvoiceId::from_uuid(uuid);
        let quotation_id = QuotationId::from_uuid(uuid);
        assert_eq!(*invoice_id.as_uuid(), *quotation_id.as_uuid());
    }

    #[test]
    fn test_id_prefixes_are_unique() {
        let prefixes = vec![
            QuotationId::prefix(),
            InvoiceId::prefix(),
            LineItemId::prefix(),
            PaymentId::prefix(),
            ClientId::prefix(),
        ];

        let mut unique_prefixes: Vec<&str> = prefixes.clone();
        unique_prefixes.sort();
        unique_prefixes.dedup();

        assert_eq!(
            prefixes.len(),
            unique_prefixes.len(),
            "All identifier prefixes should be unique"
        );
    }
}

mod edge_cases {
    use super::*;

    #[test]
    fn test_nil_uuid() {
        let id = ClientId::from_uuid(Uuid::nil());
        assert!(id.as_uuid().is_nil());
    }

    #[test]
    fn test_invalid_string_fails_to_parse() {
        assert!("not-a-uuid".parse::<PaymentId>().is_err());
    }
}
