//! Single popup shared by every foreign-key input.
//!
//! An input asks the [`PickerHost`] to open a picker for the referenced
//! table; opening another one replaces it. The popup itself is rendered
//! once by [`popup::PickerPopup`].

pub mod popup;
pub mod position;

use contracts::shared::commit::display_value;
use contracts::shared::row::Row;
use leptos::prelude::*;
use position::Rect;

/// Text handed to the input when `row` is picked: the referenced column.
pub fn selected_value(row: &Row, column: &str) -> String {
    display_value(row.get(column))
}

/// What the popup should show and where the chosen value goes.
#[derive(Clone, Copy)]
pub struct PickerRequest {
    /// Id of the input that opened the popup
    pub anchor_id: u64,
    pub anchor: Rect,
    pub table: &'static str,
    pub column: &'static str,
    /// Receives the text of the selected row's referenced column
    pub on_select: Callback<String>,
}

#[derive(Clone, Copy)]
pub struct PickerHost {
    request: RwSignal<Option<PickerRequest>>,
    next_anchor_id: StoredValue<u64>,
}

impl PickerHost {
    pub fn new() -> Self {
        Self {
            request: RwSignal::new(None),
            next_anchor_id: StoredValue::new(0),
        }
    }

    /// Id distinguishing one input from the others.
    pub fn next_anchor_id(&self) -> u64 {
        let id = self.next_anchor_id.get_value();
        self.next_anchor_id.set_value(id + 1);
        id
    }

    pub fn open(&self, request: PickerRequest) {
        self.request.set(Some(request));
    }

    pub fn close(&self) {
        self.request.set(None);
    }

    /// Closes the popup only if `anchor_id` opened it.
    pub fn close_for(&self, anchor_id: u64) {
        if self.is_open_for(anchor_id) {
            self.close();
        }
    }

    pub fn is_open_for(&self, anchor_id: u64) -> bool {
        self.request
            .with_untracked(|r| r.as_ref().map(|r| r.anchor_id) == Some(anchor_id))
    }

    pub fn current(&self) -> Option<PickerRequest> {
        self.request.get()
    }
}

impl Default for PickerHost {
    fn default() -> Self {
        Self::new()
    }
}
