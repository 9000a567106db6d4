//! Catch-all for unknown routes.

use leptos::prelude::*;

use crate::util::auth::PUBLIC_LANDING;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <main class="not-found-page">
            <h1>"Page not found"</h1>
            <a href=PUBLIC_LANDING>"Back to home"</a>
        </main>
    }
}
