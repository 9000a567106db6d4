//! OAuth callback: adopt the token the backend put in the query string.
//!
//! SYSTEM CONTEXT
//! ==============
//! Waits for startup hydration to finish, then signs in with the delivered
//! token and routes by role. Failures land on `/login?error=oauth`; a
//! superseded sign-in follows the session state that replaced it.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::session::use_session;
use crate::state::auth::AuthState;
use crate::util::oauth::{callback_target, callback_token};

#[component]
pub fn AuthCallbackPage() -> impl IntoView {
    let session = use_session();
    let auth = session.state();
    let query = use_query_map();
    let navigate = use_navigate();
    let started = StoredValue::new(false);

    Effect::new(move || {
        if started.get_value() || auth.with(AuthState::is_initializing) {
            return;
        }
        started.set_value(true);

        let token = query.with_untracked(|q| {
            callback_token(q.get("access_token").as_deref(), q.get("token_type").as_deref())
        });
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            let outcome = match token {
                Some(token) => Some(session.login_with_token(token).await),
                None => {
                    log::warn!("oauth callback without a bearer token");
                    None
                }
            };
            if let Some(Err(e)) = &outcome {
                log::warn!("oauth callback sign-in did not apply: {e}");
            }
            let target = auth.with_untracked(|current| callback_target(outcome, current));
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        });
    });

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Processing authentication..."</h1>
                <p class="login-card__subtitle">"Please wait while we complete your login."</p>
            </div>
        </div>
    }
}
