//! Client Domain - the agency's client registry
//!
//! Client records hold the contact details that get snapshotted onto
//! quotations and invoices at creation time. Clients are soft-deleted so
//! existing documents keep a valid reference.

pub mod client;
pub mod error;

pub use client::{Client, ContactSnapshot};
pub use error::ClientError;
