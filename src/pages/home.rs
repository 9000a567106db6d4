//! Public landing page.

use leptos::prelude::*;

use crate::session::use_session;
use crate::state::auth::AuthState;
use crate::util::auth::landing_route;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_session().state();

    view! {
        <main class="home-page">
            <h1>"Noleij"</h1>
            <p class="home-page__tagline">"Communities, posts and conversations."</p>
            <Show when=move || !auth.with(AuthState::is_initializing)>
                <Show
                    when=move || auth.with(AuthState::is_authenticated)
                    fallback=|| {
                        view! {
                            <nav class="home-page__actions">
                                <a class="login-button" href="/login">"Log In"</a>
                                <a class="login-button" href="/register">"Sign Up"</a>
                            </nav>
                        }
                    }
                >
                    <a class="login-button" href=move || auth.with(landing_route)>
                        "Continue to your feed"
                    </a>
                </Show>
            </Show>
        </main>
    }
}
