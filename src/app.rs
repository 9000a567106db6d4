//! Root application component with routing and the session provider.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::net::types::Role;
use crate::pages::{
    auth_callback::AuthCallbackPage, home::HomePage, login::LoginPage, member::MemberPage,
    not_found::NotFoundPage, register::RegisterPage,
};
use crate::session::Session;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the session context and starts hydration after the first render
/// so route guards never decide before the stored token has been resolved.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = Session::browser();
    provide_context(session);

    #[cfg(feature = "hydrate")]
    Effect::new(move || leptos::task::spawn_local(session.hydrate()));
    session.watch_other_tabs();

    view! {
        <Stylesheet id="leptos" href="/pkg/noleij.css"/>
        <Title text="Noleij"/>

        <Router>
            <Routes fallback=|| view! { <NotFoundPage/> }>
                <Route path=StaticSegment("") view=HomePage/>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("register") view=RegisterPage/>
                <Route path=(StaticSegment("auth"), StaticSegment("callback")) view=AuthCallbackPage/>
                <Route path=StaticSegment("user") view=|| view! { <MemberPage area=Role::User/> }/>
                <Route path=StaticSegment("admin") view=|| view! { <MemberPage area=Role::Admin/> }/>
                <Route
                    path=StaticSegment("superadmin")
                    view=|| view! { <MemberPage area=Role::SuperAdmin/> }
                />
            </Routes>
        </Router>
    }
}
