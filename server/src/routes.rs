//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Serves the Leptos app with SSR plus its compiled `/pkg` assets. The auth
//! REST API lives on a separate origin; nothing here touches sessions.

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

/// Leptos SSR routes, a health check, and `/pkg` assets via the fallback.
pub fn app(leptos_options: LeptosOptions) -> Router {
    let routes = generate_route_list(noleij_web::app::App);

    Router::new()
        .route("/healthz", get(healthz))
        .leptos_routes(&leptos_options, routes, {
            let opts = leptos_options.clone();
            move || noleij_web::app::shell(opts.clone())
        })
        .fallback(leptos_axum::file_and_error_handler(noleij_web::app::shell))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(leptos_options)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
