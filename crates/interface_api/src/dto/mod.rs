//! Request/response data transfer objects

pub mod billing;
pub mod client;
