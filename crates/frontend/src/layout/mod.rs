pub mod navbar;

use crate::shared::notice::NoticeCards;
use crate::shared::picker::popup::PickerPopup;
use crate::system::auth::context::{end_session, use_auth};
use leptos::prelude::*;
use navbar::Navbar;

/// Main application shell.
///
/// ```text
/// +------------------------------------------+
/// |                 Header                   |
/// +------------------------------------------+
/// |  Navbar  |  warning cards + content      |
/// +------------------------------------------+
/// ```
///
/// The picker popup is mounted once here and shared by every grid.
#[component]
pub fn Shell(children: Children) -> impl IntoView {
    let (auth_state, set_auth_state) = use_auth();
    let user_label = move || {
        auth_state.with(|s| {
            s.user_info
                .as_ref()
                .map(|u| {
                    if u.is_admin {
                        format!("{} (admin)", u.username)
                    } else {
                        u.username.clone()
                    }
                })
                .unwrap_or_default()
        })
    };

    view! {
        <div class="app-layout">
            <header class="top-header">
                <span class="top-header__title">"Geography"</span>
                <span class="top-header__user">{user_label}</span>
                <button
                    class="button button--secondary"
                    on:click=move |_| end_session(set_auth_state)
                >
                    "Log out"
                </button>
            </header>
            <div class="app-body">
                <aside class="app-sidebar">
                    <Navbar />
                </aside>
                <main class="app-main">
                    <NoticeCards />
                    {children()}
                </main>
            </div>
            <PickerPopup />
        </div>
    }
}
