//! Session store: the single owner of "who is logged in" for a tab.
//!
//! ARCHITECTURE
//! ============
//! The store is plain Rust over two seams, [`AuthApi`] for the backend and
//! [`TokenStore`] for persistence, so every transition can be driven in tests
//! without a browser. The reactive `Session` handle publishes snapshots of
//! [`AuthState`] after each operation.
//!
//! INVARIANTS
//! ==========
//! - A stored token is either being resolved or already resolved; any
//!   resolution failure clears the token and role hint.
//! - A failed operation leaves state and storage untouched.
//! - Every identity change bumps an epoch. An operation that settles after
//!   a newer change discards its result instead of applying it.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::{Cell, RefCell};

use crate::net::api::{ApiError, AuthApi};
use crate::net::types::{Credentials, Identity};
use crate::state::auth::{AuthState, Phase};
use crate::util::token_store::TokenStore;

/// Typed failure of a session operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("session token was rejected")]
    TokenInvalid,
    #[error("registration failed: {0}")]
    Registration(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("session changed before the request completed")]
    Superseded,
}

impl SessionError {
    /// Message suitable for an inline form error.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid email or password".to_owned(),
            Self::TokenInvalid => "Your session has expired. Please log in again.".to_owned(),
            Self::Registration(detail) | Self::Rejected(detail) => detail.clone(),
            Self::Network(_) => "Something went wrong. Please try again.".to_owned(),
            Self::Superseded => String::new(),
        }
    }

    fn from_login(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized { .. } => Self::InvalidCredentials,
            ApiError::Status { status, detail } => {
                Self::Rejected(detail.unwrap_or_else(|| format!("Login failed ({status})")))
            }
            ApiError::Network(msg) | ApiError::Decode(msg) => Self::Network(msg),
        }
    }

    fn from_resolve(err: ApiError) -> Self {
        if err.is_rejection() { Self::TokenInvalid } else { Self::Network(err.to_string()) }
    }

    fn from_register(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized { detail } | ApiError::Status { detail, .. } => {
                Self::Registration(detail.unwrap_or_else(|| "Registration failed".to_owned()))
            }
            ApiError::Network(msg) | ApiError::Decode(msg) => Self::Network(msg),
        }
    }
}

/// Owner of the current [`AuthState`] and the persisted token.
pub struct SessionStore<A, S> {
    api: A,
    storage: S,
    state: RefCell<AuthState>,
    epoch: Cell<u64>,
    /// Set when another tab changed the token while hydration was in flight.
    resync_pending: Cell<bool>,
}

impl<A: AuthApi, S: TokenStore> SessionStore<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            storage,
            state: RefCell::new(AuthState::default()),
            epoch: Cell::new(0),
            resync_pending: Cell::new(false),
        }
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Resolve the persisted token once at startup.
    ///
    /// Always ends in [`Phase::Ready`]. Calls after the first are no-ops.
    pub async fn hydrate(&self) {
        let phase = self.state.borrow().phase;
        if phase != Phase::Uninitialized {
            log::debug!("session hydrate skipped ({phase:?})");
            return;
        }
        let hint = self.storage.load_role_hint();
        self.state.borrow_mut().begin_hydration(hint);

        self.resolve_persisted(self.epoch.get()).await;
        while self.resync_pending.replace(false) {
            self.resolve_persisted(self.epoch.get()).await;
        }

        self.state.borrow_mut().finish_hydration();
        log::debug!("session ready (authenticated: {})", self.state.borrow().is_authenticated());
    }

    /// Re-resolve identity after another tab changed the stored token.
    ///
    /// Ignored before hydration starts. While hydration is in flight its
    /// pending result is discarded and hydration re-reads storage before
    /// reaching [`Phase::Ready`].
    pub async fn resync(&self) {
        let phase = self.state.borrow().phase;
        match phase {
            Phase::Uninitialized => return,
            Phase::Initializing => {
                self.bump_epoch();
                self.resync_pending.set(true);
                return;
            }
            Phase::Ready => {}
        }
        let epoch = self.bump_epoch();
        self.resolve_persisted(epoch).await;
    }

    pub async fn login_with_credentials(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let credentials = Credentials::normalized(email, password);
        let epoch = self.epoch.get();
        let resp = self.api.login(&credentials).await.map_err(SessionError::from_login)?;
        let identity = match resp.user {
            Some(user) => user,
            None => self
                .api
                .fetch_me(&resp.access_token)
                .await
                .map_err(SessionError::from_resolve)?,
        };
        self.commit(epoch, &resp.access_token, identity)
    }

    /// Adopt a token delivered out-of-band (OAuth callback).
    ///
    /// The token is persisted only after it resolves to an identity.
    pub async fn login_with_token(&self, token: &str) -> Result<Identity, SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::TokenInvalid);
        }
        let epoch = self.epoch.get();
        let identity = self.api.fetch_me(token).await.map_err(SessionError::from_resolve)?;
        self.commit(epoch, token, identity)
    }

    /// Create an account, then sign in with the same credentials.
    pub async fn register_account(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let credentials = Credentials::normalized(email, password);
        self.api.register(&credentials).await.map_err(SessionError::from_register)?;
        log::info!("account registered, signing in");
        self.login_with_credentials(&credentials.email, &credentials.password).await
    }

    /// Drop the session. Safe to call when already logged out.
    pub fn logout(&self) {
        self.storage.clear();
        self.state.borrow_mut().sign_out();
        self.bump_epoch();
        log::info!("signed out");
    }

    async fn resolve_persisted(&self, epoch: u64) {
        let Some(token) = self.storage.load_token() else {
            if self.is_current(epoch) {
                self.storage.clear();
                self.state.borrow_mut().sign_out();
            }
            return;
        };
        let result = self.api.fetch_me(&token).await;
        if !self.is_current(epoch) {
            log::debug!("discarding stale token resolution");
            return;
        }
        match result {
            Ok(identity) => {
                self.storage.save_role_hint(identity.role);
                self.state.borrow_mut().sign_in(identity);
            }
            Err(err) => {
                log::warn!("stored session token rejected: {err}");
                self.storage.clear();
                self.state.borrow_mut().sign_out();
            }
        }
    }

    fn commit(&self, epoch: u64, token: &str, identity: Identity) -> Result<Identity, SessionError> {
        if !self.is_current(epoch) {
            log::debug!("discarding sign-in superseded by a newer session change");
            return Err(SessionError::Superseded);
        }
        self.storage.save_token(token);
        self.storage.save_role_hint(identity.role);
        self.state.borrow_mut().sign_in(identity.clone());
        self.bump_epoch();
        log::info!("signed in as user {} ({})", identity.id, identity.role.as_str());
        Ok(identity)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.get() == epoch
    }

    fn bump_epoch(&self) -> u64 {
        let next = self.epoch.get().wrapping_add(1);
        self.epoch.set(next);
        next
    }
}
