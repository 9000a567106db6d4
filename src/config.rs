//! Build-time client configuration.
//!
//! The only recognized setting is the auth API origin, baked into the WASM
//! bundle from `NOLEIJ_API_URL` at compile time.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_URL: &str = "https://noleij.com";

/// Origin of the auth/content REST API, without a trailing slash.
pub fn api_base_url() -> String {
    resolve_api_base_url(option_env!("NOLEIJ_API_URL"))
}

fn resolve_api_base_url(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_owned()
}
