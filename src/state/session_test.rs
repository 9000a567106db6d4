use super::*;

use std::collections::HashMap;
use std::future::Future;
use std::pin::{Pin, pin};
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::executor::block_on;

use crate::net::types::{LoginResponse, Role};
use crate::util::token_store::{ROLE_HINT_KEY, TOKEN_KEY};

// =============================================================
// Fakes
// =============================================================

/// Pending on first poll, ready on the second.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    Login(Credentials),
    Register(Credentials),
    FetchMe(String),
}

#[derive(Default)]
struct FakeApi {
    /// email -> (password, token)
    accounts: RefCell<HashMap<String, (String, String)>>,
    /// token -> identity
    tokens: RefCell<HashMap<String, Identity>>,
    inline_user: Cell<bool>,
    network_down: Cell<bool>,
    slow: Cell<bool>,
    register_error: RefCell<Option<ApiError>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeApi {
    fn with_account(self, email: &str, password: &str, token: &str, identity: Identity) -> Self {
        self.accounts
            .borrow_mut()
            .insert(email.to_owned(), (password.to_owned(), token.to_owned()));
        self.tokens.borrow_mut().insert(token.to_owned(), identity);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn login_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Login(_))).count()
    }

    fn fetch_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::FetchMe(_))).count()
    }

    async fn maybe_yield(&self) {
        if self.slow.get() {
            YieldOnce(false).await;
        }
    }
}

impl AuthApi for Rc<FakeApi> {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.calls.borrow_mut().push(Call::Login(credentials.clone()));
        self.maybe_yield().await;
        if self.network_down.get() {
            return Err(ApiError::Network("offline".to_owned()));
        }
        let account = self.accounts.borrow().get(&credentials.email).cloned();
        match account {
            Some((password, token)) if password == credentials.password => {
                let user = if self.inline_user.get() { self.tokens.borrow().get(&token).cloned() } else { None };
                Ok(LoginResponse { access_token: token, token_type: Some("bearer".to_owned()), user })
            }
            _ => Err(ApiError::Unauthorized { detail: Some("Invalid credentials".to_owned()) }),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(Call::Register(credentials.clone()));
        if let Some(err) = self.register_error.borrow().clone() {
            return Err(err);
        }
        let token = format!("tok-{}", credentials.email);
        let id = i64::try_from(self.tokens.borrow().len()).unwrap() + 100;
        self.tokens.borrow_mut().insert(
            token.clone(),
            Identity { id, email: credentials.email.clone(), role: Role::User },
        );
        self.accounts
            .borrow_mut()
            .insert(credentials.email.clone(), (credentials.password.clone(), token));
        Ok(())
    }

    async fn fetch_me(&self, token: &str) -> Result<Identity, ApiError> {
        self.calls.borrow_mut().push(Call::FetchMe(token.to_owned()));
        self.maybe_yield().await;
        if self.network_down.get() {
            return Err(ApiError::Network("offline".to_owned()));
        }
        self.tokens
            .borrow()
            .get(token)
            .cloned()
            .ok_or(ApiError::Unauthorized { detail: Some("Could not validate credentials".to_owned()) })
    }
}

/// Shared in-memory storage; clones see the same map, like two tabs.
#[derive(Clone, Default)]
struct MemoryStore(Rc<RefCell<HashMap<String, String>>>);

impl MemoryStore {
    fn with(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (k, v) in entries {
            store.0.borrow_mut().insert((*k).to_owned(), (*v).to_owned());
        }
        store
    }

    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }
}

impl TokenStore for MemoryStore {
    fn load_token(&self) -> Option<String> {
        self.get(TOKEN_KEY)
    }

    fn load_role_hint(&self) -> Option<Role> {
        self.get(ROLE_HINT_KEY).map(|r| Role::parse(&r))
    }

    fn save_token(&self, token: &str) {
        self.0.borrow_mut().insert(TOKEN_KEY.to_owned(), token.to_owned());
    }

    fn save_role_hint(&self, role: Role) {
        self.0.borrow_mut().insert(ROLE_HINT_KEY.to_owned(), role.as_str().to_owned());
    }

    fn clear(&self) {
        let mut map = self.0.borrow_mut();
        map.remove(TOKEN_KEY);
        map.remove(ROLE_HINT_KEY);
    }
}

type TestStore = SessionStore<Rc<FakeApi>, MemoryStore>;

fn alice() -> Identity {
    Identity { id: 1, email: "alice@example.com".to_owned(), role: Role::Admin }
}

fn api_with_alice() -> Rc<FakeApi> {
    Rc::new(FakeApi::default().with_account("alice@example.com", "secret", "tok-alice", alice()))
}

fn store(api: &Rc<FakeApi>, storage: &MemoryStore) -> TestStore {
    SessionStore::new(Rc::clone(api), storage.clone())
}

// =============================================================
// hydrate
// =============================================================

#[test]
fn hydrate_without_token_is_ready_and_anonymous() {
    let api = api_with_alice();
    let s = store(&api, &MemoryStore::default());
    block_on(s.hydrate());
    let state = s.snapshot();
    assert_eq!(state.phase, Phase::Ready);
    assert!(!state.is_authenticated());
    assert_eq!(api.fetch_calls(), 0);
}

#[test]
fn hydrate_with_valid_token_populates_identity() {
    let api = api_with_alice();
    let storage = MemoryStore::with(&[(TOKEN_KEY, "tok-alice")]);
    let s = store(&api, &storage);
    block_on(s.hydrate());
    let state = s.snapshot();
    assert!(!state.is_initializing());
    assert_eq!(state.identity, Some(alice()));
    assert_eq!(storage.get(ROLE_HINT_KEY).as_deref(), Some("admin"));
}

#[test]
fn hydrate_with_rejected_token_clears_storage() {
    let api = api_with_alice();
    let storage = MemoryStore::with(&[(TOKEN_KEY, "expired"), (ROLE_HINT_KEY, "super_admin")]);
    let s = store(&api, &storage);
    block_on(s.hydrate());
    let state = s.snapshot();
    assert_eq!(state.phase, Phase::Ready);
    assert!(!state.is_authenticated());
    assert_eq!(state.role_hint, None);
    assert_eq!(storage.get(TOKEN_KEY), None);
    assert_eq!(storage.get(ROLE_HINT_KEY), None);
}

#[test]
fn hydrate_network_failure_still_reaches_ready_and_clears_token() {
    let api = api_with_alice();
    api.network_down.set(true);
    let storage = MemoryStore::with(&[(TOKEN_KEY, "tok-alice")]);
    let s = store(&api, &storage);
    block_on(s.hydrate());
    assert_eq!(s.snapshot().phase, Phase::Ready);
    assert_eq!(storage.get(TOKEN_KEY), None);
}

#[test]
fn hydrate_twice_fetches_once() {
    let api = api_with_alice();
    let storage = MemoryStore::with(&[(TOKEN_KEY, "tok-alice")]);
    let s = store(&api, &storage);
    block_on(s.hydrate());
    block_on(s.hydrate());
    assert_eq!(api.fetch_calls(), 1);
    assert_eq!(s.snapshot().identity, Some(alice()));
}

#[test]
fn concurrent_hydrate_does_not_double_fetch() {
    let api = api_with_alice();
    api.slow.set(true);
    let storage = MemoryStore::with(&[(TOKEN_KEY, "tok-alice")]);
    let s = store(&api, &storage);

    let mut first = pin!(s.hydrate());
    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    assert!(first.as_mut().poll(&mut cx).is_pending());
    assert_eq!(s.snapshot().phase, Phase::Initializing);

    block_on(s.hydrate());
    block_on(first);
    assert_eq!(api.fetch_calls(), 1);
    assert_eq!(s.snapshot().identity, Some(alice()));
}

#[test]
fn hydrate_exposes_role_hint_while_initializing() {
    let api = api_with_alice();
    api.slow.set(true);
    let storage = MemoryStore::with(&[(TOKEN_KEY, "tok-alice"), (ROLE_HINT_KEY, "super admin")]);
    let s = store(&api, &storage);

    let mut fut = pin!(s.hydrate());
    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    assert!(fut.as_mut().poll(&mut cx).is_pending());
    assert_eq!(s.snapshot().effective_role(), Some(Role::SuperAdmin));

    block_on(fut);
    assert_eq!(s.snapshot().effective_role(), Some(Role::Admin));
}

// =============================================================
// login_with_credentials
// =============================================================

#[test]
fn login_normalizes_email_before_calling_backend() {
    let api = Rc::new(FakeApi::default().with_account(
        "user@example.com",
        "secret",
        "tok-user",
        Identity { id: 5, email: "user@example.com".to_owned(), role: Role::User },
    ));
    let s = store(&api, &MemoryStore::default());
    block_on(s.login_with_credentials("USER@Example.com", "secret")).unwrap();
    assert_eq!(
        api.calls()[0],
        Call::Login(Credentials { email: "user@example.com".to_owned(), password: "secret".to_owned() })
    );
}

#[test]
fn login_persists_token_and_returns_identity() {
    let api = api_with_alice();
    let storage = MemoryStore::default();
    let s = store(&api, &storage);
    let identity = block_on(s.login_with_credentials(" alice@example.com ", "secret")).unwrap();
    assert_eq!(identity, alice());
    assert_eq!(s.snapshot().identity, Some(alice()));
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok-alice"));
    assert_eq!(storage.get(ROLE_HINT_KEY).as_deref(), Some("admin"));
}

#[test]
fn login_uses_inline_user_without_profile_fetch() {
    let api = api_with_alice();
    api.inline_user.set(true);
    let s = store(&api, &MemoryStore::default());
    block_on(s.login_with_credentials("alice@example.com", "secret")).unwrap();
    assert_eq!(api.fetch_calls(), 0);
}

#[test]
fn login_then_reload_yields_same_identity() {
    let api = api_with_alice();
    let storage = MemoryStore::default();
    let first = store(&api, &storage);
    let identity = block_on(first.login_with_credentials("alice@example.com", "secret")).unwrap();

    let reloaded = store(&api, &storage);
    block_on(reloaded.hydrate());
    assert_eq!(reloaded.snapshot().identity, Some(identity));
}

#[test]
fn login_wrong_password_is_invalid_credentials_and_changes_nothing() {
    let api = api_with_alice();
    let storage = MemoryStore::with(&[(ROLE_HINT_KEY, "user")]);
    let s = store(&api, &storage);
    block_on(s.hydrate());
    let before = s.snapshot();

    let err = block_on(s.login_with_credentials("alice@example.com", "wrong")).unwrap_err();
    assert_eq!(err, SessionError::InvalidCredentials);
    assert_eq!(err.user_message(), "Invalid email or password");
    assert_eq!(s.snapshot(), before);
    assert_eq!(storage.get(TOKEN_KEY), None);
}

#[test]
fn login_network_failure_is_network_error() {
    let api = api_with_alice();
    api.network_down.set(true);
    let s = store(&api, &MemoryStore::default());
    let err = block_on(s.login_with_credentials("alice@example.com", "secret")).unwrap_err();
    assert!(matches!(err, SessionError::Network(_)));
    assert_eq!(err.user_message(), "Something went wrong. Please try again.");
}

#[test]
fn logout_during_login_discards_result() {
    let api = api_with_alice();
    api.slow.set(true);
    let storage = MemoryStore::default();
    let s = store(&api, &storage);

    let mut fut = pin!(s.login_with_credentials("alice@example.com", "secret"));
    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    assert!(fut.as_mut().poll(&mut cx).is_pending());
    s.logout();

    assert_eq!(block_on(fut), Err(SessionError::Superseded));
    assert!(!s.snapshot().is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY), None);
}

// =============================================================
// login_with_token
// =============================================================

#[test]
fn login_with_token_resolves_then_persists() {
    let api = api_with_alice();
    let storage = MemoryStore::default();
    let s = store(&api, &storage);
    let identity = block_on(s.login_with_token("tok-alice")).unwrap();
    assert_eq!(identity, alice());
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok-alice"));
}

#[test]
fn login_with_bad_token_is_token_invalid_and_not_persisted() {
    let api = api_with_alice();
    let storage = MemoryStore::default();
    let s = store(&api, &storage);
    assert_eq!(block_on(s.login_with_token("forged")), Err(SessionError::TokenInvalid));
    assert_eq!(storage.get(TOKEN_KEY), None);
    assert!(!s.snapshot().is_authenticated());
}

#[test]
fn login_with_blank_token_skips_backend() {
    let api = api_with_alice();
    let s = store(&api, &MemoryStore::default());
    assert_eq!(block_on(s.login_with_token("   ")), Err(SessionError::TokenInvalid));
    assert!(api.calls().is_empty());
}

// =============================================================
// register_account
// =============================================================

#[test]
fn register_then_signs_in() {
    let api = Rc::new(FakeApi::default());
    let storage = MemoryStore::default();
    let s = store(&api, &storage);
    let identity = block_on(s.register_account("New@Example.com", "pw123")).unwrap();
    assert_eq!(identity.email, "new@example.com");
    assert!(s.snapshot().is_authenticated());
    assert_eq!(api.login_calls(), 1);
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok-new@example.com"));
}

#[test]
fn register_conflict_surfaces_backend_message_and_skips_login() {
    let api = Rc::new(FakeApi::default());
    *api.register_error.borrow_mut() =
        Some(ApiError::Status { status: 400, detail: Some("email already registered".to_owned()) });
    let s = store(&api, &MemoryStore::default());

    let err = block_on(s.register_account("new@example.com", "pw123")).unwrap_err();
    assert_eq!(err, SessionError::Registration("email already registered".to_owned()));
    assert_eq!(err.user_message(), "email already registered");
    assert_eq!(api.login_calls(), 0);
    assert!(!s.snapshot().is_authenticated());
}

#[test]
fn register_failure_without_detail_has_generic_message() {
    let api = Rc::new(FakeApi::default());
    *api.register_error.borrow_mut() = Some(ApiError::Status { status: 500, detail: None });
    let s = store(&api, &MemoryStore::default());
    let err = block_on(s.register_account("new@example.com", "pw123")).unwrap_err();
    assert_eq!(err.user_message(), "Registration failed");
}

// =============================================================
// logout
// =============================================================

#[test]
fn logout_then_hydrate_is_anonymous() {
    let api = api_with_alice();
    let storage = MemoryStore::default();
    let s = store(&api, &storage);
    block_on(s.login_with_credentials("alice@example.com", "secret")).unwrap();
    s.logout();
    assert!(!s.snapshot().is_authenticated());

    let reloaded = store(&api, &storage);
    block_on(reloaded.hydrate());
    assert!(!reloaded.snapshot().is_authenticated());
}

#[test]
fn logout_when_logged_out_is_harmless() {
    let api = api_with_alice();
    let storage = MemoryStore::default();
    let s = store(&api, &storage);
    s.logout();
    s.logout();
    assert!(!s.snapshot().is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY), None);
}

// =============================================================
// resync (cross-tab)
// =============================================================

#[test]
fn resync_picks_up_login_from_other_tab() {
    let api = api_with_alice();
    let storage = MemoryStore::default();
    let this_tab = store(&api, &storage);
    block_on(this_tab.hydrate());

    let other_tab = store(&api, &storage);
    block_on(other_tab.login_with_credentials("alice@example.com", "secret")).unwrap();

    block_on(this_tab.resync());
    assert_eq!(this_tab.snapshot().identity, Some(alice()));
}

#[test]
fn resync_picks_up_logout_from_other_tab() {
    let api = api_with_alice();
    let storage = MemoryStore::with(&[(TOKEN_KEY, "tok-alice")]);
    let this_tab = store(&api, &storage);
    block_on(this_tab.hydrate());
    assert!(this_tab.snapshot().is_authenticated());

    store(&api, &storage).logout();
    block_on(this_tab.resync());
    assert!(!this_tab.snapshot().is_authenticated());
}

#[test]
fn logout_in_other_tab_during_hydration_ends_anonymous() {
    let api = api_with_alice();
    api.slow.set(true);
    let storage = MemoryStore::with(&[(TOKEN_KEY, "tok-alice")]);
    let this_tab = store(&api, &storage);

    let mut hydrating = pin!(this_tab.hydrate());
    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    assert!(hydrating.as_mut().poll(&mut cx).is_pending());

    store(&api, &storage).logout();
    block_on(this_tab.resync());
    block_on(hydrating);

    let state = this_tab.snapshot();
    assert_eq!(state.phase, Phase::Ready);
    assert!(!state.is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY), None);
}

#[test]
fn login_in_other_tab_during_hydration_is_picked_up() {
    let api = api_with_alice();
    api.slow.set(true);
    let storage = MemoryStore::default();
    storage.save_token("expired");
    let this_tab = store(&api, &storage);

    let mut hydrating = pin!(this_tab.hydrate());
    let mut cx = Context::from_waker(futures::task::noop_waker_ref());
    assert!(hydrating.as_mut().poll(&mut cx).is_pending());

    storage.save_token("tok-alice");
    block_on(this_tab.resync());
    block_on(hydrating);

    let state = this_tab.snapshot();
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.identity, Some(alice()));
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("tok-alice"));
}

#[test]
fn resync_before_hydration_is_ignored() {
    let api = api_with_alice();
    let storage = MemoryStore::with(&[(TOKEN_KEY, "tok-alice")]);
    let s = store(&api, &storage);
    block_on(s.resync());
    assert_eq!(s.snapshot().phase, Phase::Uninitialized);
    assert_eq!(api.fetch_calls(), 0);
}
