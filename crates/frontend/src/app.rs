use crate::routes::routes::AppRoutes;
use crate::shared::notice::NoticeBoard;
use crate::shared::picker::PickerHost;
use crate::system::auth::context::AuthProvider;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    // Warning cards raised by any grid
    provide_context(NoticeBoard::new());

    // The single foreign-key picker slot
    provide_context(PickerHost::new());

    view! {
        <AuthProvider>
            <AppRoutes />
        </AuthProvider>
    }
}
