//! Auth-session state for the current browser tab.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by route guards and identity-aware pages. Written only by the
//! session store; components observe it through the reactive `Session`
//! handle.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::{Identity, Role};

/// Startup lifecycle of the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Hydration has not started.
    #[default]
    Uninitialized,
    /// The persisted token is being resolved.
    Initializing,
    /// Hydration finished; `identity` is meaningful.
    Ready,
}

/// Snapshot of who is logged in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub phase: Phase,
    pub identity: Option<Identity>,
    /// Last-known role from storage. Never authoritative.
    pub role_hint: Option<Role>,
}

impl AuthState {
    pub fn is_initializing(&self) -> bool {
        self.phase != Phase::Ready
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Role used for landing redirects: the resolved identity wins over the
    /// stored hint.
    pub fn effective_role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role).or(self.role_hint)
    }

    pub(crate) fn begin_hydration(&mut self, role_hint: Option<Role>) {
        self.phase = Phase::Initializing;
        self.role_hint = role_hint;
    }

    pub(crate) fn finish_hydration(&mut self) {
        self.phase = Phase::Ready;
    }

    pub(crate) fn sign_in(&mut self, identity: Identity) {
        self.role_hint = Some(identity.role);
        self.identity = Some(identity);
    }

    pub(crate) fn sign_out(&mut self) {
        self.identity = None;
        self.role_hint = None;
    }
}
