//! OAuth provider links and callback token intake.
//!
//! The backend finishes the provider handshake and redirects the browser to
//! `/auth/callback?access_token=<token>&token_type=bearer`. That is the only
//! delivery contract the client accepts.

#[cfg(test)]
#[path = "oauth_test.rs"]
mod oauth_test;

/// Login route used when the callback could not sign the user in.
pub const CALLBACK_FAILURE_REDIRECT: &str = "/login?error=oauth";

use crate::net::types::Identity;
use crate::state::auth::AuthState;
use crate::state::session::SessionError;
use crate::util::auth::{PUBLIC_LANDING, landing_route, route_for_role};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Microsoft,
}

impl OAuthProvider {
    pub const ALL: [Self; 2] = [Self::Google, Self::Microsoft];

    pub fn label(self) -> &'static str {
        match self {
            Self::Google => "Continue with Google",
            Self::Microsoft => "Continue with Microsoft",
        }
    }

    /// Full-page redirect target that starts the provider flow.
    pub fn start_url(self, api_base: &str) -> String {
        let slug = match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
        };
        format!("{}/auth/{slug}", api_base.trim_end_matches('/'))
    }
}

/// Extract the bearer token from callback query parameters.
///
/// `token_type` may be omitted, but when present it must be `bearer`.
pub fn callback_token(access_token: Option<&str>, token_type: Option<&str>) -> Option<String> {
    let token = access_token.map(str::trim).filter(|t| !t.is_empty())?;
    match token_type {
        Some(kind) if !kind.trim().eq_ignore_ascii_case("bearer") => None,
        _ => Some(token.to_owned()),
    }
}

/// Inline notice for the login page's `error` query parameter.
pub fn login_notice(error: Option<&str>) -> Option<&'static str> {
    match error? {
        "oauth" => Some("We couldn't complete that sign-in. Please try again."),
        _ => None,
    }
}

/// Where the callback page goes once sign-in settles.
///
/// `None` means no usable token was delivered. A superseded sign-in is not a
/// failure: the page follows whatever session state won instead.
pub fn callback_target(outcome: Option<Result<Identity, SessionError>>, current: &AuthState) -> &'static str {
    match outcome {
        Some(Ok(identity)) => route_for_role(identity.role),
        Some(Err(SessionError::Superseded)) if current.is_authenticated() => landing_route(current),
        Some(Err(SessionError::Superseded)) => PUBLIC_LANDING,
        Some(Err(_)) | None => CALLBACK_FAILURE_REDIRECT,
    }
}
