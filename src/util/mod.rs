//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns and routing policy
//! from page and component logic to improve reuse and testability.

pub mod auth;
pub mod oauth;
pub mod token_store;
