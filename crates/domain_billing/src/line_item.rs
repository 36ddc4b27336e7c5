//! Document line items
//!
//! Line items are exclusively owned by their document: they are cloned on
//! quotation-to-invoice conversion (with fresh ids) and cascade-deleted with
//! the document, never shared.
//!
//! The unit price is stored at full precision; only the derived line amount
//! is rounded. Rounding the inputs first would shift totals by a cent on
//! quantities above one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;
use core_kernel::{Currency, LineItemId, Money};

/// A line item on a quotation or invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier
    pub id: LineItemId,
    /// Description of the work or product
    pub description: String,
    /// Quantity (supports fractional units, e.g. hours)
    pub quantity: Decimal,
    /// Price per unit, kept at full precision
    pub unit_price: Decimal,
    /// Sort position within the document
    pub position: u32,
}

impl LineItem {
    /// Creates a new line item
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` for an empty description, a
    /// quantity that is zero or negative, or a negative unit price.
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<Self, BillingError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(BillingError::Validation(
                "Line item description is required".to_string(),
            ));
        }
        if quantity <= Decimal::ZERO {
            return Err(BillingError::Validation(format!(
                "Line item quantity must be positive, got {quantity}"
            )));
        }
        if unit_price < Decimal::ZERO {
            return Err(BillingError::Validation(format!(
                "Line item unit price cannot be negative, got {unit_price}"
            )));
        }

        Ok(Self {
            id: LineItemId::new_v7(),
            description,
            quantity,
            unit_price,
            position: 0,
        })
    }

    /// Sets the sort position
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    /// The line amount: quantity x unit price, rounded half-up to 2 decimals.
    ///
    /// Always derived from the raw inputs; a stored amount is never trusted.
    pub fn amount(&self, currency: Currency) -> Money {
        Money::new(self.quantity * self.unit_price, currency)
    }

    /// Clones the item for a converted document, assigning a fresh id
    pub fn duplicate(&self) -> Self {
        Self {
            id: LineItemId::new_v7(),
            description: self.description.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_is_quantity_times_unit_price() {
        let item = LineItem::new("Design work", dec!(3), dec!(150.00)).unwrap();
        assert_eq!(item.amount(Currency::ZAR).amount(), dec!(450.00));
    }

    #[test]
    fn test_amount_rounds_half_up_after_multiplying() {
        // 2 * 10.005 = 20.01 exactly; the raw unit price is not pre-rounded
        let item = LineItem::new("Hosting", dec!(2), dec!(10.005)).unwrap();
        assert_eq!(item.amount(Currency::ZAR).amount(), dec!(20.01));
    }

    #[test]
    fn test_sub_cent_unit_price_rounds_down() {
        let item = LineItem::new("Licence", dec!(1), dec!(5.004)).unwrap();
        assert_eq!(item.amount(Currency::ZAR).amount(), dec!(5.00));
    }

    #[test]
    fn test_fractional_quantity() {
        let item = LineItem::new("Consulting hours", dec!(1.5), dec!(99.99)).unwrap();
        // 99.99 * 1.5 = 149.985 -> 149.99
        assert_eq!(item.amount(Currency::ZAR).amount(), dec!(149.99));
    }

    #[test]
    fn test_rejects_empty_description() {
        let result = LineItem::new("  ", dec!(1), dec!(10));
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let result = LineItem::new("Work", dec!(0), dec!(10));
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_rejects_negative_unit_price() {
        let result = LineItem::new("Work", dec!(1), dec!(-10));
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_duplicate_gets_fresh_id() {
        let item = LineItem::new("Work", dec!(1), dec!(10)).unwrap();
        let copy = item.duplicate();
        assert_ne!(item.id, copy.id);
        assert_eq!(item.description, copy.description);
        assert_eq!(copy.amount(Currency::ZAR), item.amount(Currency::ZAR));
    }
}
