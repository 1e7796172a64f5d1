//! PostgreSQL connectivity: client wrapper and schema introspection.

pub mod client;
pub mod introspect;

pub use client::{ConnectionReport, PgClient};
pub use introspect::extract_catalog;
