use super::position::{place_below, Size};
use super::{selected_value, PickerHost, PickerRequest};
use crate::shared::grid::DataGrid;
use crate::shared::icons::icon;
use contracts::shared::row::Row;
use leptos::ev;
use leptos::html::Div;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

const POPUP_SIZE: Size = Size {
    width: 460.0,
    height: 340.0,
};
const PICKER_PAGE_SIZE: usize = 5;

/// Attribute set on inputs that own a picker, so clicking them does not
/// count as clicking outside the popup.
pub const ANCHOR_ATTR: &str = "data-picker-anchor";

fn viewport() -> Size {
    let window = web_sys::window();
    let dim = |v: Option<wasm_bindgen::JsValue>| v.and_then(|v| v.as_f64()).unwrap_or(0.0);
    Size {
        width: dim(window.as_ref().and_then(|w| w.inner_width().ok())),
        height: dim(window.as_ref().and_then(|w| w.inner_height().ok())),
    }
}

/// The one picker popup of the page; renders whatever the host asks for.
#[component]
pub fn PickerPopup() -> impl IntoView {
    let host = use_context::<PickerHost>().expect("PickerHost not found in context");
    let popup_ref = NodeRef::<Div>::new();

    let keydown = window_event_listener(ev::keydown, move |event| {
        if event.key() == "Escape" && host.current().is_some() {
            host.close();
        }
    });

    let mousedown = window_event_listener(ev::mousedown, move |event| {
        let Some(request) = host.current() else {
            return;
        };
        let Some(target) = event.target() else {
            return;
        };
        let Ok(node) = target.dyn_into::<web_sys::Node>() else {
            return;
        };
        if let Some(popup) = popup_ref.get_untracked() {
            if popup.contains(Some(&node)) {
                return;
            }
        }
        let on_anchor = node
            .dyn_ref::<web_sys::Element>()
            .and_then(|el| el.get_attribute(ANCHOR_ATTR))
            .map(|id| id == request.anchor_id.to_string())
            .unwrap_or(false);
        if !on_anchor {
            host.close();
        }
    });

    on_cleanup(move || {
        keydown.remove();
        mousedown.remove();
    });

    move || {
        host.current().map(|request: PickerRequest| {
            let (left, top) = place_below(request.anchor, POPUP_SIZE, viewport());
            let style = format!(
                "position: fixed; left: {}px; top: {}px; width: {}px; max-height: {}px;",
                left, top, POPUP_SIZE.width, POPUP_SIZE.height
            );
            let on_select = Callback::new(move |row: Row| {
                request.on_select.run(selected_value(&row, request.column));
                host.close();
            });

            view! {
                <div class="picker-container picker-popup" style=style node_ref=popup_ref>
                    <div class="picker-header">
                        <h3>{format!("{} ({})", request.table, request.column)}</h3>
                        <button
                            class="button button--icon"
                            title="Close"
                            on:click=move |_| host.close()
                        >
                            {icon("x")}
                        </button>
                    </div>
                    <div class="picker-content">
                        <DataGrid
                            table=request.table
                            read_only=true
                            page_size=PICKER_PAGE_SIZE
                            on_select=on_select
                        />
                    </div>
                </div>
            }
        })
    }
}
