mod config;
mod routes;

use leptos::prelude::get_configuration;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let conf = get_configuration(None).expect("leptos configuration");
    let leptos_options = conf.leptos_options;
    let addr = config::resolve_addr(leptos_options.site_addr, std::env::var("PORT").ok().as_deref())
        .expect("invalid PORT");

    let app = routes::app(leptos_options);
    let listener = tokio::net::TcpListener::bind(addr).await.expect("failed to bind");

    tracing::info!(%addr, "noleij web listening");
    axum::serve(listener, app.into_make_service()).await.expect("server failed");
}
