//! Persisted bearer token and role hint.
//!
//! SYSTEM CONTEXT
//! ==============
//! `localStorage` is shared by every tab of the origin, so a write here is
//! visible to other tabs through `storage` events. Only the session store
//! writes these keys.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use crate::net::types::Role;

pub const TOKEN_KEY: &str = "token";
pub const ROLE_HINT_KEY: &str = "user_role";

/// Key/value persistence for the session artifacts.
pub trait TokenStore {
    fn load_token(&self) -> Option<String>;
    fn load_role_hint(&self) -> Option<Role>;
    fn save_token(&self, token: &str);
    fn save_role_hint(&self, role: Role);
    /// Remove both the token and the role hint.
    fn clear(&self);
}

/// [`TokenStore`] backed by `window.localStorage`.
///
/// Outside the browser every read is empty and every write is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTokenStore;

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl BrowserTokenStore {
    fn get(key: &str) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.get_item(key).ok().flatten()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            None
        }
    }

    fn set(key: &str, value: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                if storage.set_item(key, value).is_err() {
                    log::warn!("localStorage write failed for {key}");
                }
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
        }
    }

    fn remove(key: &str) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                if storage.remove_item(key).is_err() {
                    log::warn!("localStorage remove failed for {key}");
                }
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
        }
    }
}

impl TokenStore for BrowserTokenStore {
    fn load_token(&self) -> Option<String> {
        non_empty(Self::get(TOKEN_KEY))
    }

    fn load_role_hint(&self) -> Option<Role> {
        non_empty(Self::get(ROLE_HINT_KEY)).map(|raw| Role::parse(&raw))
    }

    fn save_token(&self, token: &str) {
        Self::set(TOKEN_KEY, token);
    }

    fn save_role_hint(&self, role: Role) {
        Self::set(ROLE_HINT_KEY, role.as_str());
    }

    fn clear(&self) {
        Self::remove(TOKEN_KEY);
        Self::remove(ROLE_HINT_KEY);
    }
}

/// Treat blank stored values as absent.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|v| !v.trim().is_empty())
}

/// Whether a `storage` event for `key` concerns the session.
///
/// A `None` key means another tab called `localStorage.clear()`.
pub fn is_session_key(key: Option<&str>) -> bool {
    key.is_none_or(|k| k == TOKEN_KEY)
}
