//! Document totals aggregation
//!
//! Totals are recomputed from raw line item inputs after every item edit.
//! Each stage rounds half-up to 2 decimals: line amounts, then the subtotal,
//! then the tax amount, then the grand total. The stepwise result is the
//! contract; it can differ by a cent from rounding once at the end.

use serde::{Deserialize, Serialize};

use crate::error::BillingError;
use crate::line_item::LineItem;
use core_kernel::{Currency, Money, TaxRate};

/// The derived totals of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
}

impl DocumentTotals {
    /// Zero totals for an empty document
    pub fn zero(currency: Currency) -> Self {
        Self {
            subtotal: Money::zero(currency),
            tax_amount: Money::zero(currency),
            total_amount: Money::zero(currency),
        }
    }
}

/// Recomputes document totals from line items and a tax rate.
///
/// Pure function: same items and rate always produce the same totals, and
/// reapplying it to its own output changes nothing.
///
/// # Errors
///
/// Returns `BillingError::Money` if summing the line amounts overflows the
/// currency-checked arithmetic (mixed currencies cannot occur here since all
/// amounts derive from the single document currency).
pub fn recompute(
    items: &[LineItem],
    tax_rate: TaxRate,
    currency: Currency,
) -> Result<DocumentTotals, BillingError> {
    let mut subtotal = Money::zero(currency);
    for item in items {
        subtotal = subtotal.checked_add(&item.amount(currency))?;
    }

    let tax_amount = tax_rate.apply(&subtotal);
    let total_amount = subtotal.checked_add(&tax_amount)?;

    Ok(DocumentTotals {
        subtotal,
        tax_amount,
        total_amount,
    })
}
