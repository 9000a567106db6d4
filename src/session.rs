//! Reactive session handle provided through Leptos context.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` wraps the browser [`SessionStore`] and mirrors its state into an
//! `RwSignal<AuthState>` after every operation, so guards and pages re-render
//! on identity changes. It is `Copy` and can be captured freely by event
//! handlers and spawned tasks.
//!
//! Spawned tasks publish with `try_set`: if the app root has been torn down
//! mid-request the result is dropped instead of panicking.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::net::api::{ApiClient, HttpAuthApi};
use crate::net::types::Identity;
use crate::state::auth::AuthState;
use crate::state::session::{SessionError, SessionStore};
use crate::util::auth::PUBLIC_LANDING;
use crate::util::token_store::BrowserTokenStore;

pub type BrowserSessionStore = SessionStore<HttpAuthApi, BrowserTokenStore>;

#[derive(Clone, Copy)]
pub struct Session {
    state: RwSignal<AuthState>,
    store: StoredValue<Rc<BrowserSessionStore>, LocalStorage>,
}

impl Session {
    /// Session backed by `localStorage` and the configured API origin.
    pub fn browser() -> Self {
        let api = HttpAuthApi::new(ApiClient::from_config());
        Self::with_store(SessionStore::new(api, BrowserTokenStore))
    }

    fn with_store(store: BrowserSessionStore) -> Self {
        Self { state: RwSignal::new(store.snapshot()), store: StoredValue::new_local(Rc::new(store)) }
    }

    pub fn state(self) -> Signal<AuthState> {
        self.state.into()
    }

    pub async fn hydrate(self) {
        let store = self.store.get_value();
        store.hydrate().await;
        self.publish(&store);
    }

    pub async fn resync(self) {
        let store = self.store.get_value();
        store.resync().await;
        self.publish(&store);
    }

    pub async fn login_with_credentials(self, email: String, password: String) -> Result<Identity, SessionError> {
        let store = self.store.get_value();
        let result = store.login_with_credentials(&email, &password).await;
        self.publish(&store);
        result
    }

    pub async fn login_with_token(self, token: String) -> Result<Identity, SessionError> {
        let store = self.store.get_value();
        let result = store.login_with_token(&token).await;
        self.publish(&store);
        result
    }

    pub async fn register_account(self, email: String, password: String) -> Result<Identity, SessionError> {
        let store = self.store.get_value();
        let result = store.register_account(&email, &password).await;
        self.publish(&store);
        result
    }

    /// Clear the session and return to the public landing page.
    pub fn logout<F>(self, navigate: F)
    where
        F: Fn(&str, NavigateOptions),
    {
        let store = self.store.get_value();
        store.logout();
        self.publish(&store);
        navigate(PUBLIC_LANDING, NavigateOptions::default());
    }

    /// Re-resolve identity when another tab writes or clears the token.
    ///
    /// The listener is removed when the owning scope is cleaned up.
    pub fn watch_other_tabs(self) {
        #[cfg(feature = "hydrate")]
        {
            let handle = window_event_listener(leptos::ev::storage, move |ev| {
                let key = ev.key();
                if crate::util::token_store::is_session_key(key.as_deref()) {
                    log::debug!("session token changed in another tab");
                    leptos::task::spawn_local(self.resync());
                }
            });
            on_cleanup(move || handle.remove());
        }
    }

    fn publish(self, store: &BrowserSessionStore) {
        let next = store.snapshot();
        let changed = self.state.try_with_untracked(|current| *current != next).unwrap_or(false);
        if changed {
            let _ = self.state.try_set(next);
        }
    }
}

/// The session provided by the root `App`.
///
/// # Panics
///
/// Panics when called outside the `App` provider; that is a wiring bug.
pub fn use_session() -> Session {
    expect_context::<Session>()
}
