//! Declarative auth gate around a page subtree.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages wrap their content in `RouteGuard`. The guard never renders while the
//! session is hydrating and never navigates during render: redirects are
//! issued from an effect, once per guard instance.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::session::use_session;
use crate::util::auth::{GuardDecision, guard_decision, install_guard_redirect};

/// Render `children` only when the session satisfies `require_auth`.
///
/// With `require_auth = false` the page is public-only and signed-in users
/// are sent to their role landing route.
#[component]
pub fn RouteGuard(#[prop(default = true)] require_auth: bool, children: ChildrenFn) -> impl IntoView {
    let auth = use_session().state();
    install_guard_redirect(auth, require_auth, use_navigate());

    let render = Memo::new(move |_| auth.with(|state| guard_decision(state, require_auth)) == GuardDecision::Render);

    move || render.get().then(|| children())
}
