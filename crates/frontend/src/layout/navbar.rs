use crate::shared::icons;
use contracts::shared::registry;
use leptos::prelude::*;
use leptos_router::components::A;

fn icon_for(table: &str) -> AnyView {
    let name = match table {
        registry::CONTINENTS => "globe",
        registry::COUNTRIES => "flag",
        registry::REGIONS => "map",
        registry::CITIES => "building",
        registry::DISTRICTS => "pin",
        _ => "",
    };
    icons::icon(name)
}

#[component]
pub fn Navbar() -> impl IntoView {
    view! {
        <nav class="main-nav-bar">
            <ul>
                {registry::tables().map(|table| {
                    view! {
                        <li>
                            <A href=format!("/{}", table)>
                                {icon_for(table)}
                                <span>{registry::table_title(table)}</span>
                            </A>
                        </li>
                    }
                }).collect_view()}
            </ul>
        </nav>
    }
}
