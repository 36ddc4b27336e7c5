//! Client entity and contact snapshots
//!
//! A client is the counterparty on quotations and invoices. Documents never
//! link to client contact details live; instead a [`ContactSnapshot`] is
//! copied onto the document at creation time, so later edits to the client
//! record do not rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ClientError;
use core_kernel::ClientId;

/// A client of the agency
///
/// Clients are soft-deleted: `deleted_at` is set rather than removing the
/// row, because historical documents keep referencing the client id.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Client {
    /// Unique identifier
    pub id: ClientId,
    /// Display / company name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    /// Billing contact email
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Contact phone number
    pub phone: Option<String>,
    /// Postal or street address
    pub address: Option<String>,
    /// VAT or tax registration number
    pub tax_number: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Creates a new client record
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` when the name is empty or the email
    /// address is malformed.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, ClientError> {
        let now = Utc::now();
        let client = Self {
            id: ClientId::new_v7(),
            name: name.into(),
            email: email.into(),
            phone: None,
            address: None,
            tax_number: None,
            notes: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        client
            .validate()
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        Ok(client)
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Returns true if the client has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Marks the client as deleted
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Extracts the contact snapshot to copy onto a new document
    ///
    /// # Errors
    ///
    /// Returns `ClientError::MissingContactField` when the name or email is
    /// empty, and `ClientError::ClientDeleted` for soft-deleted clients.
    pub fn contact_snapshot(&self) -> Result<ContactSnapshot, ClientError> {
        if self.is_deleted() {
            return Err(ClientError::ClientDeleted(self.id.to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ClientError::MissingContactField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ClientError::MissingContactField("email"));
        }

        Ok(ContactSnapshot {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        })
    }
}

/// Contact details frozen onto a document at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}
