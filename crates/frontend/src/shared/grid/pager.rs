use crate::shared::icons::icon;
use leptos::prelude::*;

/// Page numbers (1-based) shown between the prev/next buttons: a window of
/// `button_count` pages that keeps the current page inside it.
pub fn page_window(current: usize, total_pages: usize, button_count: usize) -> Vec<usize> {
    if total_pages == 0 || button_count == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);
    let count = button_count.min(total_pages);
    let mut start = current.saturating_sub(count / 2).max(1);
    if start + count - 1 > total_pages {
        start = total_pages + 1 - count;
    }
    (start..start + count).collect()
}

/// Pager with first/prev/numbered/next/last buttons. Pages are 1-based.
#[component]
pub fn GridPager(
    #[prop(into)] current_page: Signal<usize>,
    #[prop(into)] total_pages: Signal<usize>,
    #[prop(into)] total_count: Signal<u64>,
    on_page_change: Callback<usize>,
    #[prop(optional, default = 3)] button_count: usize,
) -> impl IntoView {
    view! {
        <div class="pagination-controls">
            <button
                class="pagination-btn"
                on:click=move |_| on_page_change.run(1)
                disabled=move || current_page.get() <= 1
                title="First page"
            >
                {icon("chevrons-left")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let page = current_page.get();
                    if page > 1 {
                        on_page_change.run(page - 1);
                    }
                }
                disabled=move || current_page.get() <= 1
                title="Previous page"
            >
                {icon("chevron-left")}
            </button>
            {move || {
                let current = current_page.get();
                page_window(current, total_pages.get(), button_count)
                    .into_iter()
                    .map(|page| {
                        view! {
                            <button
                                class="pagination-btn pagination-btn--page"
                                class:pagination-btn--current={page == current}
                                on:click=move |_| on_page_change.run(page)
                            >
                                {page.to_string()}
                            </button>
                        }
                    })
                    .collect_view()
            }}
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let page = current_page.get();
                    if page < total_pages.get() {
                        on_page_change.run(page + 1);
                    }
                }
                disabled=move || current_page.get() >= total_pages.get()
                title="Next page"
            >
                {icon("chevron-right")}
            </button>
            <button
                class="pagination-btn"
                on:click=move |_| {
                    let total = total_pages.get();
                    if total > 0 {
                        on_page_change.run(total);
                    }
                }
                disabled=move || current_page.get() >= total_pages.get()
                title="Last page"
            >
                {icon("chevrons-right")}
            </button>
            <span class="pagination-info">
                {move || {
                    format!(
                        "{} / {} ({})",
                        current_page.get(),
                        total_pages.get().max(1),
                        total_count.get()
                    )
                }}
            </span>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(1, 10, 3), vec![1, 2, 3]);
        assert_eq!(page_window(5, 10, 3), vec![4, 5, 6]);
        assert_eq!(page_window(10, 10, 3), vec![8, 9, 10]);
        assert_eq!(page_window(1, 2, 3), vec![1, 2]);
        assert_eq!(page_window(7, 2, 3), vec![1, 2]);
        assert!(page_window(1, 0, 3).is_empty());
    }
}
