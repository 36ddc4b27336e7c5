//! Request handlers

pub mod clients;
pub mod health;
pub mod invoices;
pub mod payments;
pub mod quotations;
