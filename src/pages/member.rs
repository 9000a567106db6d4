//! Signed-in landing areas (`/user`, `/admin`, `/superadmin`).

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::route_guard::RouteGuard;
use crate::net::types::Role;
use crate::session::use_session;

fn area_title(area: Role) -> &'static str {
    match area {
        Role::User => "Your feed",
        Role::Admin => "Admin",
        Role::SuperAdmin => "Super Admin",
    }
}

/// Member landing page for `area`, visible only when signed in.
#[component]
pub fn MemberPage(area: Role) -> impl IntoView {
    view! {
        <RouteGuard>
            <MemberHome area=area/>
        </RouteGuard>
    }
}

#[component]
fn MemberHome(area: Role) -> impl IntoView {
    let session = use_session();
    let auth = session.state();
    let navigate = use_navigate();

    let signed_in_as = move || {
        auth.with(|s| {
            s.identity
                .as_ref()
                .map(|identity| format!("{} ({})", identity.email, identity.role.as_str()))
        })
    };

    view! {
        <div class="member-page">
            <header class="member-page__header">
                <h1>{area_title(area)}</h1>
                <span class="member-page__self">{move || signed_in_as().unwrap_or_default()}</span>
                <button class="btn member-page__logout" on:click=move |_| session.logout(navigate.clone())>
                    "Log out"
                </button>
            </header>
        </div>
    }
}
