//! Backend networking: the HTTP client, wire types, and endpoint wrappers.

pub mod api;
pub mod http;
pub mod types;
