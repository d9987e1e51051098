//! Graphion Metadata Service Library
//!
//! Core components of the Graphion metadata service: the session and query
//! lifecycle subsystem, its key-value store backends, and the HTTP API.

pub mod api;
pub mod session;
pub mod store;
pub mod user;
