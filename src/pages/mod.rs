//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration. Auth gating is delegated to
//! `RouteGuard`; role routing to `util::auth`.

pub mod auth_callback;
pub mod home;
pub mod login;
pub mod member;
pub mod not_found;
pub mod register;

use leptos::prelude::*;

use crate::config::api_base_url;
use crate::util::oauth::OAuthProvider;

/// Full-page links into the backend's OAuth flows.
#[component]
pub(crate) fn OAuthButtons() -> impl IntoView {
    let api_base = api_base_url();
    OAuthProvider::ALL
        .into_iter()
        .map(|provider| {
            view! {
                <a class="login-button login-button--oauth" href=provider.start_url(&api_base)>
                    {provider.label()}
                </a>
            }
        })
        .collect_view()
}
