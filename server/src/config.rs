//! Host configuration parsed from the environment.
//!
//! Leptos settings (`LEPTOS_SITE_ROOT`, `LEPTOS_SITE_ADDR`, ...) come from
//! `get_configuration`; `PORT` overrides the listen port for hosted deploys.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

/// Apply an optional `PORT` override to the configured address.
pub fn resolve_addr(configured: SocketAddr, port: Option<&str>) -> Result<SocketAddr, ConfigError> {
    let Some(raw) = port.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(configured);
    };
    let port: u16 = raw.parse().map_err(|_| ConfigError::InvalidPort(raw.to_owned()))?;
    Ok(SocketAddr::new(configured.ip(), port))
}
