use crate::shared::picker::position::Rect;
use crate::shared::picker::{PickerHost, PickerRequest};
use contracts::shared::field::FieldDescriptor;
use leptos::html::Input;
use leptos::prelude::*;

/// Text input of a foreign-key column. Focusing it opens the picker over
/// the referenced table right beneath the input.
#[component]
pub fn ForeignKeyInput(
    field: &'static FieldDescriptor,
    #[prop(into)] value: Signal<String>,
    on_change: Callback<String>,
    #[prop(optional, into)] invalid: MaybeProp<bool>,
) -> impl IntoView {
    let host = use_context::<PickerHost>().expect("PickerHost not found in context");
    let anchor_id = host.next_anchor_id();
    let input_ref = NodeRef::<Input>::new();

    let open_picker = move || {
        let Some(fk) = field.foreign_key else {
            return;
        };
        let Some(input) = input_ref.get_untracked() else {
            return;
        };
        let rect = input.get_bounding_client_rect();
        host.open(PickerRequest {
            anchor_id,
            anchor: Rect {
                left: rect.left(),
                top: rect.top(),
                width: rect.width(),
                height: rect.height(),
            },
            table: fk.table,
            column: fk.column,
            on_select: on_change,
        });
    };

    on_cleanup(move || host.close_for(anchor_id));

    view! {
        <input
            type="text"
            class="form__input grid__input grid__input--fk"
            class:grid__input--invalid=move || invalid.get().unwrap_or(false)
            style=format!("width: {}px;", field.width)
            placeholder=field.title
            data-picker-anchor=anchor_id.to_string()
            node_ref=input_ref
            prop:value=move || value.get()
            on:focus=move |_| open_picker()
            on:input=move |ev| on_change.run(event_target_value(&ev))
        />
    }
}

