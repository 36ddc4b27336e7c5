//! Database infrastructure - PostgreSQL persistence for the billing engine
//!
//! Provides connection pooling and repository implementations. Repositories
//! map rows to domain entities and keep every multi-row change (document
//! plus line items, payment plus invoice status) inside one transaction.

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig};
pub use repositories::{
    ClientRepository, InvoiceRepository, NewInvoice, NewPayment, NewQuotation, PaymentRepository,
    QuotationRepository,
};
