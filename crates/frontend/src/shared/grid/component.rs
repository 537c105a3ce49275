use super::controller::{build_row, draft_from_row, same_key, GridController};
use super::fk_field::ForeignKeyInput;
use super::pager::GridPager;
use super::transport::{GlooTransport, GridError};
use crate::shared::icons::icon;
use crate::shared::list_utils::{get_sort_indicator, sort_rows, SortState};
use crate::shared::notice::NoticeBoard;
use crate::system::auth::context::{end_session, use_auth, AuthState};
use contracts::shared::commit::display_value;
use contracts::shared::field::{FieldDescriptor, FieldKind};
use contracts::shared::registry;
use contracts::shared::row::{page_count, PageQuery, Row, DEFAULT_PAGE_SIZE};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

type Controller = Rc<GridController<GlooTransport, NoticeBoard>>;
type Draft = RwSignal<HashMap<String, String>>;

/// Marks the column named by a commit error, sends the user back to the
/// login page on a lost session, or logs anything else.
fn flag_invalid(
    error: &GridError,
    invalid: RwSignal<HashSet<String>>,
    set_auth_state: WriteSignal<AuthState>,
) {
    match error {
        GridError::Commit(e) => invalid.update(|set| {
            set.insert(e.field().to_string());
        }),
        GridError::Unauthorized => end_session(set_auth_state),
        other => log::debug!("grid action failed: {}", other),
    }
}

/// Input for one cell of the insert row or of the row being edited.
fn cell_editor(
    field: &'static FieldDescriptor,
    draft: Draft,
    invalid: RwSignal<HashSet<String>>,
) -> AnyView {
    let name = field.name;
    let value = Signal::derive(move || draft.with(|d| d.get(name).cloned().unwrap_or_default()));
    let on_change = Callback::new(move |text: String| {
        invalid.update(|set| {
            set.remove(name);
        });
        draft.update(|d| {
            d.insert(name.to_string(), text);
        });
    });
    let is_invalid = Signal::derive(move || invalid.with(|set| set.contains(name)));

    match field.kind {
        FieldKind::ForeignKey => view! {
            <ForeignKeyInput field=field value=value on_change=on_change invalid=is_invalid />
        }
        .into_any(),
        _ => {
            let input_type = match field.kind {
                FieldKind::Number { .. } => "number",
                _ => "text",
            };
            view! {
                <input
                    type=input_type
                    class="form__input grid__input"
                    class:grid__input--invalid=move || is_invalid.get()
                    style=format!("width: {}px;", field.width)
                    placeholder=field.title
                    prop:value=move || value.get()
                    on:input=move |ev| on_change.run(event_target_value(&ev))
                />
            }
            .into_any()
        }
    }
}

fn confirm_delete(row: &Row, fields: &[FieldDescriptor]) -> bool {
    let key = fields
        .iter()
        .filter(|f| f.key)
        .map(|f| display_value(row.get(f.name)))
        .collect::<Vec<_>>()
        .join(", ");
    web_sys::window()
        .and_then(|win| {
            win.confirm_with_message(&format!("Delete row {}?", key))
                .ok()
        })
        .unwrap_or(false)
}

/// Paged, sortable grid over one registered table.
///
/// Editable by default: a trailing control column edits and deletes rows,
/// and an insert row sits under the header. With `read_only` the grid only
/// lists rows and reports clicks through `on_select`.
#[component]
pub fn DataGrid(
    table: &'static str,
    #[prop(optional)] read_only: bool,
    #[prop(optional)] on_select: Option<Callback<Row>>,
    #[prop(optional, default = DEFAULT_PAGE_SIZE)] page_size: usize,
) -> impl IntoView {
    let Some(fields) = registry::fields(table) else {
        return view! {
            <div class="warning-box">
                <span class="warning-box__text">{format!("Unknown table '{}'", table)}</span>
            </div>
        }
        .into_any();
    };
    let data_fields = registry::data_fields(table);
    let has_control = !read_only && fields.iter().any(|f| f.is_control());

    let notices = use_context::<NoticeBoard>().expect("NoticeBoard not found in context");
    let (auth_state, set_auth_state) = use_auth();
    // only admins may update and delete
    let can_modify = move || auth_state.with(|s| s.is_admin());
    let controller: StoredValue<Controller, LocalStorage> =
        StoredValue::new_local(Rc::new(GridController::new(table, GlooTransport, notices)));

    let page_index = RwSignal::new(1usize);
    let items = RwSignal::new(Vec::<Row>::new());
    let items_count = RwSignal::new(0u64);
    let sort = RwSignal::new(None::<SortState>);
    let load_error = RwSignal::new(None::<String>);
    let reload = RwSignal::new(0u64);

    // the row being edited, matched by key so sorting keeps the inputs on it
    let editing = RwSignal::new(None::<Row>);
    let edit_draft: Draft = RwSignal::new(HashMap::new());
    let insert_draft: Draft = RwSignal::new(HashMap::new());
    let invalid = RwSignal::new(HashSet::<String>::new());

    let total_pages = Signal::derive(move || page_count(items_count.get(), page_size));

    Effect::new(move |_| {
        let query = PageQuery::new(page_index.get(), page_size);
        reload.track();
        let grid = controller.get_value();
        spawn_local(async move {
            match grid.load_data(query).await {
                Ok(page) => {
                    let pages = page.total_pages(page_size);
                    if page.data.is_empty() && query.page_index > 1 && pages > 0 {
                        // the last page emptied out under us
                        page_index.set(pages.min(query.page_index - 1));
                        return;
                    }
                    let mut data = page.data;
                    if let Some(s) = sort.get_untracked() {
                        sort_rows(&mut data, &s.field, s.ascending);
                    }
                    items_count.set(page.items_count);
                    items.set(data);
                    load_error.set(None);
                }
                Err(GridError::Unauthorized) => end_session(set_auth_state),
                Err(e) => load_error.set(Some(e.to_string())),
            }
        });
    });

    let end_edit = move || {
        controller.get_value().cancel_edit();
        editing.set(None);
        invalid.set(HashSet::new());
    };

    // Rows may move on reload, so an open edit would land on another row.
    let refresh = move || {
        end_edit();
        reload.update(|n| *n += 1);
    };

    let start_edit = move |row: Row| {
        controller.get_value().begin_edit(row.clone());
        edit_draft.set(draft_from_row(fields, &row));
        invalid.set(HashSet::new());
        editing.set(Some(row));
    };

    let save_edit = move || {
        let row = match edit_draft.with_untracked(|d| build_row(fields, d)) {
            Ok(row) => row,
            Err(e) => return flag_invalid(&e, invalid, set_auth_state),
        };
        let grid = controller.get_value();
        spawn_local(async move {
            let result = grid.update_item(row).await;
            end_edit();
            match result {
                Ok(_) => refresh(),
                Err(e) => flag_invalid(&e, invalid, set_auth_state),
            }
        });
    };

    let insert = move || {
        let row = match insert_draft.with_untracked(|d| build_row(fields, d)) {
            Ok(row) => row,
            Err(e) => return flag_invalid(&e, invalid, set_auth_state),
        };
        let grid = controller.get_value();
        spawn_local(async move {
            match grid.insert_item(row).await {
                Ok(_) => {
                    insert_draft.set(HashMap::new());
                    refresh();
                }
                Err(e) => {
                    // the controller has dropped the edit already
                    end_edit();
                    flag_invalid(&e, invalid, set_auth_state);
                }
            }
        });
    };

    let delete = move |row: Row| {
        if !confirm_delete(&row, fields) {
            return;
        }
        let grid = controller.get_value();
        spawn_local(async move {
            match grid.delete_item(row).await {
                Ok(_) => refresh(),
                Err(e) => {
                    end_edit();
                    flag_invalid(&e, invalid, set_auth_state);
                }
            }
        });
    };

    let toggle_sort = move |field: &'static str| {
        let next = SortState::toggled(sort.get_untracked().as_ref(), field);
        items.update(|rows| sort_rows(rows, &next.field, next.ascending));
        sort.set(Some(next));
    };

    let header_fields = data_fields.clone();
    let insert_fields = data_fields.clone();
    let row_fields = data_fields;

    view! {
        <div class="grid">
            {move || load_error.get().map(|e| view! {
                <div class="warning-box" style="background: var(--color-error-50); border-color: var(--color-error-100);">
                    <span class="warning-box__icon" style="color: var(--color-error);">"⚠"</span>
                    <span class="warning-box__text" style="color: var(--color-error);">{e}</span>
                </div>
            })}

            <div class="table">
                <table class="table__data table--striped">
                    <thead class="table__head">
                        <tr>
                            {header_fields.iter().map(|&field| {
                                let name = field.name;
                                view! {
                                    <th
                                        class="table__header-cell table__header-cell--sortable"
                                        style=format!("width: {}px;", field.width)
                                        on:click=move |_| toggle_sort(name)
                                    >
                                        {field.title}
                                        <span class="sort-indicator">
                                            {move || sort.with(|s| get_sort_indicator(s.as_ref(), name))}
                                        </span>
                                    </th>
                                }
                            }).collect_view()}
                            {has_control.then(|| view! {
                                <th class="table__header-cell table__header-cell--actions"></th>
                            })}
                        </tr>
                        {(!read_only).then(|| view! {
                            <tr class="table__row table__row--insert">
                                {insert_fields.iter().map(|&field| view! {
                                    <td class="table__cell">
                                        {cell_editor(field, insert_draft, invalid)}
                                    </td>
                                }).collect_view()}
                                <td class="table__cell table__cell--actions">
                                    <button
                                        class="button button--icon button--primary"
                                        title="Insert"
                                        on:click=move |_| insert()
                                    >
                                        {icon("plus")}
                                    </button>
                                </td>
                            </tr>
                        })}
                    </thead>
                    <tbody>
                        {move || {
                            let row_fields = row_fields.clone();
                            items.get().into_iter().map(move |row| {
                                let is_editing = editing.with(|e| {
                                    e.as_ref().is_some_and(|edited| same_key(fields, edited, &row))
                                });
                                let cells = row_fields.iter().map(|&field| {
                                    let cell = if is_editing {
                                        cell_editor(field, edit_draft, invalid)
                                    } else {
                                        display_value(row.get(field.name)).into_any()
                                    };
                                    view! { <td class="table__cell">{cell}</td> }
                                }).collect_view();

                                let row_for_select = row.clone();
                                let row_for_edit = row.clone();
                                let row_for_delete = row.clone();
                                let actions = has_control.then(|| {
                                    if is_editing {
                                        view! {
                                            <td class="table__cell table__cell--actions">
                                                <button class="button button--icon" title="Save" on:click=move |_| save_edit()>
                                                    {icon("check")}
                                                </button>
                                                <button class="button button--icon" title="Cancel" on:click=move |_| end_edit()>
                                                    {icon("x")}
                                                </button>
                                            </td>
                                        }.into_any()
                                    } else if can_modify() {
                                        view! {
                                            <td class="table__cell table__cell--actions">
                                                <button
                                                    class="button button--icon"
                                                    title="Edit"
                                                    on:click=move |_| start_edit(row_for_edit.clone())
                                                >
                                                    {icon("edit")}
                                                </button>
                                                <button
                                                    class="button button--icon"
                                                    title="Delete"
                                                    on:click=move |_| delete(row_for_delete.clone())
                                                >
                                                    {icon("delete")}
                                                </button>
                                            </td>
                                        }.into_any()
                                    } else {
                                        view! { <td class="table__cell table__cell--actions"></td> }.into_any()
                                    }
                                });

                                view! {
                                    <tr
                                        class="table__row"
                                        class:table__row--editing=is_editing
                                        class:table__row--selectable=read_only
                                        on:click=move |_| {
                                            if let Some(cb) = on_select {
                                                cb.run(row_for_select.clone());
                                            }
                                        }
                                    >
                                        {cells}
                                        {actions}
                                    </tr>
                                }
                            }).collect_view()
                        }}
                    </tbody>
                </table>
            </div>

            <div class="grid__footer">
                <GridPager
                    current_page=page_index
                    total_pages=total_pages
                    total_count=items_count
                    on_page_change=Callback::new(move |page: usize| {
                        end_edit();
                        page_index.set(page);
                    })
                />
                <button class="button button--secondary" title="Refresh" on:click=move |_| refresh()>
                    {icon("refresh")}
                </button>
            </div>
        </div>
    }
    .into_any()
}
