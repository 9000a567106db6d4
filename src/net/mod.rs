//! Networking modules for the auth REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` owns HTTP transport and error classification; `types` defines the
//! wire schema shared with the backend.

pub mod api;
pub mod types;
