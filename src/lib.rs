//! # noleij-web
//!
//! Leptos + WASM frontend for the Noleij community feed.
//!
//! The interesting part is the session layer: `state::session` owns login,
//! registration, OAuth token intake and startup hydration from
//! `localStorage`; `components::route_guard` gates pages on that state with
//! role-based redirects from `util::auth`.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod session;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered app in the browser.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
