//! Shared wire DTOs for the auth REST API.
//!
//! DESIGN
//! ======
//! Role strings are parsed leniently: the backend has shipped both
//! `super_admin` and `super admin`, and any role the client does not know
//! about is treated as a general member.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Access tier of an authenticated account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Role {
    /// General member.
    #[default]
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Canonical wire spelling, also used for the persisted role hint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Parse a role string from the backend or from storage.
    ///
    /// Unknown values map to [`Role::User`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "super_admin" | "super admin" | "superadmin" => Self::SuperAdmin,
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// The resolved account behind a bearer token (`GET /users/me`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    /// Older backends omit the role for plain members.
    #[serde(default)]
    pub role: Role,
}

/// Body of `POST /auth/login` and `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Build credentials with the email trimmed and lowercased.
    ///
    /// The password is passed through untouched.
    pub fn normalized(email: &str, password: &str) -> Self {
        Self { email: normalize_email(email), password: password.to_owned() }
    }
}

/// Trim surrounding whitespace and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Response of `POST /auth/login`.
///
/// Some backend revisions return the user inline; others return only the
/// token and expect a follow-up profile fetch.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<Identity>,
}
