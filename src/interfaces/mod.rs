//! Inbound adapters: CSV seed loading and the HTTP API.

pub mod csv;
pub mod http;
