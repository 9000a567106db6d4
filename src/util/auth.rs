//! Shared route-access policy.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every post-login redirect (login form, registration, OAuth callback, route
//! guard) goes through [`route_for_role`] so the landing page never depends
//! on the entry point.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::net::types::Role;
use crate::state::auth::AuthState;

/// Public landing route for anonymous visitors.
pub const PUBLIC_LANDING: &str = "/";

/// Member landing route for a role.
pub fn route_for_role(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "/superadmin",
        Role::Admin => "/admin",
        Role::User => "/user",
    }
}

/// Landing route for whatever role the state currently knows about.
pub fn landing_route(state: &AuthState) -> &'static str {
    route_for_role(state.effective_role().unwrap_or_default())
}

/// What a route guard should do for the current session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still hydrating: render nothing, do not navigate.
    Pending,
    /// Render nothing and navigate to the target.
    Redirect(&'static str),
    /// Render the wrapped subtree.
    Render,
}

/// Decide guard behavior.
///
/// `require_auth = false` marks a public-only page (login, register) that
/// signed-in users are bounced away from.
pub fn guard_decision(state: &AuthState, require_auth: bool) -> GuardDecision {
    if state.is_initializing() {
        return GuardDecision::Pending;
    }
    match (require_auth, state.identity.as_ref()) {
        (true, None) => GuardDecision::Redirect(PUBLIC_LANDING),
        (false, Some(identity)) => GuardDecision::Redirect(route_for_role(identity.role)),
        _ => GuardDecision::Render,
    }
}

/// One-shot redirect gate for a single guard instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedirectLatch {
    fired: bool,
}

impl RedirectLatch {
    /// Returns the navigation target the first time a redirect is observed.
    pub fn observe(&mut self, decision: GuardDecision) -> Option<&'static str> {
        match decision {
            GuardDecision::Redirect(target) if !self.fired => {
                self.fired = true;
                Some(target)
            }
            _ => None,
        }
    }
}

/// Navigate once, after render, whenever the guard decides to redirect.
pub fn install_guard_redirect<F>(auth: Signal<AuthState>, require_auth: bool, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    let latch = StoredValue::new(RedirectLatch::default());
    Effect::new(move || {
        let decision = auth.with(|state| guard_decision(state, require_auth));
        let target = latch.try_update_value(|l| l.observe(decision)).flatten();
        if let Some(target) = target {
            log::debug!("route guard redirecting to {target}");
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}
