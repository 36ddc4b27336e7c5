//! Client domain errors

use thiserror::Error;

/// Errors that can occur in the client domain
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client not found
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// A required contact field is missing or empty
    #[error("Missing contact field: {0}")]
    MissingContactField(&'static str),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation attempted on a deleted client
    #[error("Client {0} has been deleted")]
    ClientDeleted(String),
}
