//! Dismissible warning cards shown above the grids.

use crate::shared::icons::icon;
use leptos::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub title: String,
    pub message: String,
}

/// Ordered list of cards with monotonically increasing ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoticeList {
    items: Vec<Notice>,
    next_id: u64,
}

impl NoticeList {
    pub fn push(&mut self, title: &str, message: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Notice {
            id,
            title: title.to_string(),
            message: message.to_string(),
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Receiver of warnings raised by grid controllers.
pub trait NoticeSink {
    fn warn(&self, title: &str, message: &str);
}

impl NoticeSink for RefCell<NoticeList> {
    fn warn(&self, title: &str, message: &str) {
        self.borrow_mut().push(title, message);
    }
}

impl<S: NoticeSink + ?Sized> NoticeSink for Rc<S> {
    fn warn(&self, title: &str, message: &str) {
        (**self).warn(title, message)
    }
}

/// App-wide board of warning cards, provided through context.
#[derive(Clone, Copy)]
pub struct NoticeBoard {
    list: RwSignal<NoticeList>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self {
            list: RwSignal::new(NoticeList::default()),
        }
    }

    pub fn dismiss(&self, id: u64) {
        self.list.update(|l| l.dismiss(id));
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.list.with(|l| l.items().to_vec())
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeSink for NoticeBoard {
    fn warn(&self, title: &str, message: &str) {
        self.list.update(|l| {
            l.push(title, message);
        });
    }
}

#[component]
pub fn NoticeCards() -> impl IntoView {
    let board = use_context::<NoticeBoard>().expect("NoticeBoard not found in context");

    view! {
        <div class="notice-stack">
            {move || board.notices().into_iter().map(|notice| {
                let id = notice.id;
                view! {
                    <div class="warning-box notice-card" role="alert">
                        <span class="warning-box__icon">{icon("alert")}</span>
                        <div class="notice-card__content">
                            <strong class="notice-card__title">{notice.title}</strong>
                            <span class="warning-box__text">{notice.message}</span>
                        </div>
                        <button
                            class="button button--icon notice-card__close"
                            title="Dismiss"
                            on:click=move |_| board.dismiss(id)
                        >
                            {icon("x")}
                        </button>
                    </div>
                }
            }).collect_view()}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut list = NoticeList::default();
        let a = list.push("Countries", "duplicate key");
        let b = list.push("Cities", "missing region");
        assert_ne!(a, b);
        assert_eq!(list.len(), 2);

        list.dismiss(a);
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].message, "missing region");

        list.dismiss(a);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut list = NoticeList::default();
        let a = list.push("t", "m");
        list.dismiss(a);
        let b = list.push("t", "m");
        assert!(b > a);
    }

    #[test]
    fn test_shared_sink_records_warnings() {
        let sink = Rc::new(RefCell::new(NoticeList::default()));
        sink.warn("Regions", "bad value");
        assert_eq!(sink.borrow().items()[0].title, "Regions");
    }
}
