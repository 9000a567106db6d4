//! Client-side application state.
//!
//! DESIGN
//! ======
//! `auth` is the plain snapshot components render from; `session` owns the
//! transitions that produce it.

pub mod auth;
pub mod session;
