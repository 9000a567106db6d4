//! Login page: email + password sign-in and OAuth provider links.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::components::route_guard::RouteGuard;
use crate::pages::OAuthButtons;
use crate::session::use_session;
use crate::state::session::SessionError;
use crate::util::auth::route_for_role;
use crate::util::oauth::login_notice;

/// Trim the email and require both fields.
fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Enter your email and password.");
    }
    Ok((email.to_owned(), password.to_owned()))
}

#[component]
pub fn LoginPage() -> impl IntoView {
    view! {
        <RouteGuard require_auth=false>
            <LoginForm/>
        </RouteGuard>
    }
}

#[component]
fn LoginForm() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let query = use_query_map();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let notice = move || query.with(|q| login_notice(q.get("error").as_deref()));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get_untracked(), &password.get_untracked()) {
            Ok(values) => values,
            Err(msg) => {
                error.set(Some(msg.to_owned()));
                return;
            }
        };
        busy.set(true);
        error.set(None);

        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match session.login_with_credentials(email_value, password_value).await {
                Ok(identity) => navigate(route_for_role(identity.role), NavigateOptions::default()),
                Err(SessionError::Superseded) => {}
                Err(e) => {
                    log::warn!("login failed: {e}");
                    let _ = error.try_set(Some(e.user_message()));
                }
            }
            let _ = busy.try_set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Noleij"</h1>
                <p class="login-card__subtitle">"Sign in to your account"</p>
                {move || notice().map(|msg| view! { <p class="login-message">{msg}</p> })}
                <OAuthButtons/>
                <div class="login-divider"></div>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        placeholder="Email"
                        autocomplete="username"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <Show when=move || error.get().is_some()>
                        <p class="login-message login-message--error">{move || error.get().unwrap_or_default()}</p>
                    </Show>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Logging in..." } else { "Log In" }}
                    </button>
                </form>
                <p class="login-card__footer">
                    "New here? "
                    <a href="/register">"Sign Up"</a>
                </p>
            </div>
        </div>
    }
}
