//! Repository implementations
//!
//! Each repository wraps a `PgPool` and maps between database rows and
//! domain entities. Status and currency columns are stored as text and
//! parsed back through the domain `FromStr` impls; a value that fails to
//! parse is a `SerializationError`.

pub mod clients;
pub mod invoices;
pub mod line_items;
pub mod payments;
pub mod quotations;

pub use clients::ClientRepository;
pub use invoices::{InvoiceRepository, NewInvoice};
pub use payments::{NewPayment, PaymentRepository};
pub use quotations::{NewQuotation, QuotationRepository};
