use crate::layout::Shell;
use crate::shared::grid::DataGrid;
use crate::system::auth::context::use_auth;
use crate::system::pages::login::LoginPage;
use contracts::shared::registry;
use leptos::prelude::*;
use leptos_router::components::{Redirect, Route, Router, Routes};
use leptos_router::hooks::use_params_map;
use leptos_router::path;

/// Grid of the table named by the `:table` path segment.
#[component]
fn TablePage() -> impl IntoView {
    let params = use_params_map();
    let table = move || {
        params
            .read()
            .get("table")
            .and_then(|segment| registry::resolve_table(&segment))
    };

    move || match table() {
        Some(table) => view! {
            <div class="page">
                <div class="header">
                    <div class="header__content">
                        <h1 class="header__title">{registry::table_title(table)}</h1>
                    </div>
                </div>
                <DataGrid table=table />
            </div>
        }
        .into_any(),
        None => view! {
            <div class="warning-box">
                <span class="warning-box__text">"Unknown table"</span>
            </div>
        }
        .into_any(),
    }
}

/// The grids once logged in, the login page otherwise.
#[component]
pub fn AppRoutes() -> impl IntoView {
    let (auth_state, _) = use_auth();

    view! {
        <Show
            when=move || auth_state.with(|s| s.is_authenticated())
            fallback=|| view! { <LoginPage /> }
        >
            <GridRoutes />
        </Show>
    }
}

#[component]
fn GridRoutes() -> impl IntoView {
    let home = format!("/{}", registry::CONTINENTS);

    view! {
        <Router>
            <Shell>
                <Routes fallback=|| view! { <p>"Page not found."</p> }>
                    <Route
                        path=path!("/")
                        view=move || view! { <Redirect path=home.clone() /> }
                    />
                    <Route path=path!("/:table") view=TablePage />
                </Routes>
            </Shell>
        </Router>
    }
}
