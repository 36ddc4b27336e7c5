//! Document number generation
//!
//! Every billing document carries a human-readable number assigned exactly
//! once, at creation:
//!
//! - invoices: `INV-YYYY-NNNNNN` (random 6-digit suffix)
//! - quotations: `QT-YYYY-NNNNNN` (random 6-digit suffix)
//! - payments: `PAY-YYYY-NNNN` (sequential 4-digit suffix)
//!
//! Random suffixes can collide, so allocation is retried against an
//! existence check with a hard attempt cap; the persistence layer backs this
//! up with a unique index and treats a duplicate-key insert the same way as
//! a failed pre-check. Once persisted, a number is never regenerated or
//! mutated, even if the record is later edited.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum attempts when allocating a random document number
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10;

/// Highest payment sequence representable in the 4-digit suffix
pub const MAX_PAYMENT_SEQUENCE: u32 = 9999;

/// The kind of document a number is issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Quotation,
}

impl DocumentKind {
    /// Returns the number prefix for this document kind
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::Quotation => "QT",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Errors that can occur while assigning document numbers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberingError {
    /// All allocation attempts collided with existing numbers
    #[error("Could not allocate a unique {kind} number for {year} after {attempts} attempts")]
    AttemptsExhausted {
        kind: DocumentKind,
        year: i32,
        attempts: u32,
    },

    /// The yearly payment sequence has no room left in 4 digits
    #[error("Payment sequence exhausted for {year}: next sequence {sequence} exceeds {MAX_PAYMENT_SEQUENCE}")]
    SequenceOverflow { year: i32, sequence: u32 },
}

/// Generates a candidate document number with a random 6-digit suffix.
///
/// The result is not guaranteed unique; use [`allocate_document_number`] or
/// a persistence-layer unique index to enforce uniqueness.
pub fn random_document_number(kind: DocumentKind, year: i32) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}-{}-{:06}", kind.prefix(), year, suffix)
}

/// Allocates a document number, re-rolling the random suffix on collision.
///
/// `is_taken` is consulted for each candidate; allocation gives up after
/// [`MAX_ALLOCATION_ATTEMPTS`] collisions rather than looping forever.
///
/// # Errors
///
/// Returns `NumberingError::AttemptsExhausted` when every candidate collided.
pub fn allocate_document_number(
    kind: DocumentKind,
    year: i32,
    mut is_taken: impl FnMut(&str) -> bool,
) -> Result<String, NumberingError> {
    for _ in 0..MAX_ALLOCATION_ATTEMPTS {
        let candidate = random_document_number(kind, year);
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }
    Err(NumberingError::AttemptsExhausted {
        kind,
        year,
        attempts: MAX_ALLOCATION_ATTEMPTS,
    })
}

/// Builds the next payment number from the latest issued sequence.
///
/// Payment numbers are sequential per year: `PAY-YYYY-NNNN` where NNNN is
/// `last_sequence + 1`, zero-padded to 4 digits.
///
/// # Errors
///
/// Returns `NumberingError::SequenceOverflow` once the yearly sequence
/// passes 9999.
pub fn next_payment_number(year: i32, last_sequence: u32) -> Result<String, NumberingError> {
    let sequence = last_sequence + 1;
    if sequence > MAX_PAYMENT_SEQUENCE {
        return Err(NumberingError::SequenceOverflow { year, sequence });
    }
    Ok(format!("PAY-{}-{:04}", year, sequence))
}

/// Checks a document number against the `{PREFIX}-YYYY-NNNNNN` pattern
pub fn is_valid_document_number(kind: DocumentKind, number: &str) -> bool {
    matches_pattern(number, kind.prefix(), 6)
}

/// Checks a payment number against the `PAY-YYYY-NNNN` pattern
pub fn is_valid_payment_number(number: &str) -> bool {
    matches_pattern(number, "PAY", 4)
}

fn matches_pattern(number: &str, prefix: &str, suffix_len: usize) -> bool {
    let mut parts = number.splitn(3, '-');
    let (Some(p), Some(year), Some(suffix)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    p == prefix
        && year.len() == 4
        && year.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == suffix_len
        && suffix.bytes().all(|b| b.is_ascii_digit())
}
