use std::cell::RefCell;
use std::collections::HashMap;

use contracts::shared::commit::{commit_value, display_value};
use contracts::shared::field::FieldDescriptor;
use contracts::shared::registry;
use contracts::shared::row::{items_path, OldNew, PageQuery, PageResponse, Row};
use serde_json::Value;

use super::transport::{classify_response, GridError, GridTransport, HttpMethod};
use crate::shared::notice::NoticeSink;

/// Builds a row from the raw text of the edit inputs.
pub fn build_row(
    fields: &[FieldDescriptor],
    draft: &HashMap<String, String>,
) -> Result<Row, GridError> {
    let mut row = Row::new();
    for field in fields.iter().filter(|f| !f.is_control()) {
        let raw = draft.get(field.name).map(String::as_str).unwrap_or("");
        row.insert(field.name.to_string(), commit_value(field, raw)?);
    }
    Ok(row)
}

/// Text of each data cell of `row`, as prefilled into the edit inputs.
pub fn draft_from_row(fields: &[FieldDescriptor], row: &Row) -> HashMap<String, String> {
    fields
        .iter()
        .filter(|f| !f.is_control())
        .map(|f| (f.name.to_string(), display_value(row.get(f.name))))
        .collect()
}

/// Whether `a` and `b` are the same row, judged by the key columns.
pub fn same_key(fields: &[FieldDescriptor], a: &Row, b: &Row) -> bool {
    fields
        .iter()
        .filter(|f| f.key)
        .all(|f| a.get(f.name) == b.get(f.name))
}

/// Loads pages of one table and sends its inserts, updates and deletes.
///
/// Keeps the row that was loaded when editing began, so the update can
/// tell the server which row to replace.
pub struct GridController<T, N> {
    table: &'static str,
    title: String,
    transport: T,
    notices: N,
    previous_item: RefCell<Option<Row>>,
}

impl<T: GridTransport, N: NoticeSink> GridController<T, N> {
    pub fn new(table: &'static str, transport: T, notices: N) -> Self {
        Self {
            table,
            title: registry::table_title(table),
            transport,
            notices,
            previous_item: RefCell::new(None),
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub async fn load_data(&self, query: PageQuery) -> Result<PageResponse, GridError> {
        let qs = serde_qs::to_string(&query).map_err(|e| GridError::Transport(e.to_string()))?;
        let path = format!("{}?{}", items_path(self.table), qs);
        let result = match self.transport.get(&path).await {
            Ok(response) => classify_response(response).and_then(|value| {
                serde_json::from_value::<PageResponse>(value)
                    .map_err(|e| GridError::Decode(e.to_string()))
            }),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            log::error!("{}: failed to load page {}: {}", self.table, query.page_index, e);
        }
        result
    }

    /// Remembers `item` as the row being edited.
    pub fn begin_edit(&self, item: Row) {
        *self.previous_item.borrow_mut() = Some(item);
    }

    pub fn cancel_edit(&self) {
        self.previous_item.borrow_mut().take();
    }

    pub fn editing(&self) -> Option<Row> {
        self.previous_item.borrow().clone()
    }

    pub async fn insert_item(&self, item: Row) -> Result<Row, GridError> {
        let body = Value::Object(item.clone()).to_string();
        self.mutate(HttpMethod::Post, body, item).await
    }

    /// Sends the edited row along with the row captured by [`Self::begin_edit`].
    /// The edit ends whatever the outcome.
    pub async fn update_item(&self, item: Row) -> Result<Row, GridError> {
        let old = match self.previous_item.borrow_mut().take() {
            Some(old) => old,
            None => return Err(GridError::NoEditInProgress),
        };
        let body = serde_json::to_string(&OldNew {
            old,
            new: item.clone(),
        })
        .map_err(|e| GridError::Decode(e.to_string()))?;
        self.mutate(HttpMethod::Put, body, item).await
    }

    pub async fn delete_item(&self, item: Row) -> Result<Row, GridError> {
        let body = Value::Object(item.clone()).to_string();
        self.mutate(HttpMethod::Delete, body, item).await
    }

    async fn mutate(&self, method: HttpMethod, body: String, sent: Row) -> Result<Row, GridError> {
        let path = items_path(self.table);
        let result = match self.transport.send(method, &path, body).await {
            Ok(response) => classify_response(response).map(|value| match value {
                Value::Object(row) => row,
                _ => sent,
            }),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => {}
            Err(GridError::Validation(message)) => {
                log::warn!("{}: {:?} rejected: {}", self.table, method, message);
                self.notices.warn(&self.title, message);
            }
            Err(e) => log::error!("{}: {:?} failed: {}", self.table, method, e),
        }
        if result.is_err() {
            self.cancel_edit();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::grid::transport::RawResponse;
    use crate::shared::notice::NoticeList;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::json;
    use std::rc::Rc;

    /// Replies with a fixed response and records what was sent.
    struct StubTransport {
        reply: Result<RawResponse, GridError>,
        sent: RefCell<Vec<(Option<HttpMethod>, String, String)>>,
    }

    impl StubTransport {
        fn replying(status: u16, body: &str) -> Self {
            Self {
                reply: Ok(RawResponse {
                    status,
                    body: body.to_string(),
                }),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(GridError::Transport("connection refused".into())),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl GridTransport for StubTransport {
        async fn get(&self, path: &str) -> Result<RawResponse, GridError> {
            self.sent
                .borrow_mut()
                .push((None, path.to_string(), String::new()));
            self.reply.clone()
        }

        async fn send(
            &self,
            method: HttpMethod,
            path: &str,
            body: String,
        ) -> Result<RawResponse, GridError> {
            self.sent
                .borrow_mut()
                .push((Some(method), path.to_string(), body));
            self.reply.clone()
        }
    }

    type Notices = Rc<RefCell<NoticeList>>;

    fn controller(transport: StubTransport) -> (GridController<StubTransport, Notices>, Notices) {
        let notices: Notices = Rc::new(RefCell::new(NoticeList::default()));
        (
            GridController::new(registry::CITIES, transport, notices.clone()),
            notices,
        )
    }

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_load_data_builds_paged_query() {
        let (grid, _) = controller(StubTransport::replying(
            200,
            r#"{"itemsCount": 1, "data": [{"city_id": 1, "city_name": "Paris"}]}"#,
        ));
        let page = block_on(grid.load_data(PageQuery::new(2, 10))).unwrap();
        assert_eq!(page.items_count, 1);
        let sent = grid.transport.sent.borrow();
        assert_eq!(sent[0].1, "/cities/items?page_index=2&page_size=10");
    }

    #[test]
    fn test_mutations_resolve_on_2xx() {
        let paris = row(json!({"city_id": 1, "city_name": "Paris"}));
        let (grid, notices) = controller(StubTransport::replying(
            200,
            r#"{"city_id": 1, "city_name": "Paris"}"#,
        ));

        assert_eq!(block_on(grid.insert_item(paris.clone())), Ok(paris.clone()));
        grid.begin_edit(paris.clone());
        assert_eq!(block_on(grid.update_item(paris.clone())), Ok(paris.clone()));
        assert_eq!(block_on(grid.delete_item(paris.clone())), Ok(paris));
        assert!(notices.borrow().is_empty());

        let methods: Vec<_> = grid.transport.sent.borrow().iter().map(|s| s.0).collect();
        assert_eq!(
            methods,
            vec![
                Some(HttpMethod::Post),
                Some(HttpMethod::Put),
                Some(HttpMethod::Delete)
            ]
        );
    }

    #[test]
    fn test_mutations_reject_otherwise() {
        let paris = row(json!({"city_id": 1}));

        let (grid, notices) = controller(StubTransport::replying(500, "boom"));
        assert!(matches!(
            block_on(grid.insert_item(paris.clone())),
            Err(GridError::Server { status: 500, .. })
        ));
        assert!(block_on(grid.delete_item(paris.clone())).is_err());
        assert!(notices.borrow().is_empty());

        let (grid, _) = controller(StubTransport::failing());
        grid.begin_edit(paris.clone());
        assert!(matches!(
            block_on(grid.update_item(paris)),
            Err(GridError::Transport(_))
        ));
        assert_eq!(grid.editing(), None);
    }

    #[test]
    fn test_failed_insert_ends_the_open_edit() {
        let paris = row(json!({"city_id": 1, "city_name": "Paris"}));
        let lyon = row(json!({"city_id": 2, "city_name": "Lyon"}));
        let (grid, notices) = controller(StubTransport::replying(
            278,
            r#"{"error_msg": "A row with the same key already exists in cities"}"#,
        ));

        grid.begin_edit(paris.clone());
        assert!(matches!(
            block_on(grid.insert_item(lyon)),
            Err(GridError::Validation(_))
        ));
        assert_eq!(grid.editing(), None);
        assert_eq!(notices.borrow().len(), 1);

        assert_eq!(
            block_on(grid.update_item(paris)),
            Err(GridError::NoEditInProgress)
        );
        assert_eq!(grid.transport.sent.borrow().len(), 1);
    }

    #[test]
    fn test_lost_session_is_reported_without_card() {
        let (grid, notices) = controller(StubTransport::replying(401, "unauthorized"));
        let paris = row(json!({"city_id": 1, "city_name": "Paris"}));
        grid.begin_edit(paris.clone());
        assert_eq!(
            block_on(grid.delete_item(paris)),
            Err(GridError::Unauthorized)
        );
        assert_eq!(
            block_on(grid.load_data(PageQuery::new(1, 10))).unwrap_err(),
            GridError::Unauthorized
        );
        assert!(notices.borrow().is_empty());
        assert_eq!(grid.editing(), None);
    }

    #[test]
    fn test_update_sends_old_and_new() {
        let old = row(json!({"city_id": 1, "city_name": "Paris"}));
        let new = row(json!({"city_id": 1, "city_name": "Lutetia"}));
        let (grid, _) = controller(StubTransport::replying(200, ""));

        grid.begin_edit(old.clone());
        assert_eq!(block_on(grid.update_item(new.clone())), Ok(new.clone()));
        assert_eq!(grid.editing(), None);

        let sent = grid.transport.sent.borrow();
        let body: OldNew<Row> = serde_json::from_str(&sent[0].2).unwrap();
        assert_eq!(body.old, old);
        assert_eq!(body.new, new);
    }

    #[test]
    fn test_update_without_edit_is_rejected_locally() {
        let (grid, _) = controller(StubTransport::replying(200, "{}"));
        assert_eq!(
            block_on(grid.update_item(Row::new())),
            Err(GridError::NoEditInProgress)
        );
        assert!(grid.transport.sent.borrow().is_empty());
    }

    #[test]
    fn test_validation_failure_adds_exactly_one_card_and_rejects() {
        let (grid, notices) = controller(StubTransport::replying(
            278,
            r#"{"error_msg": "Region 9 does not exist"}"#,
        ));
        let paris = row(json!({"city_id": 1, "fg_region_id": 9}));
        grid.begin_edit(paris.clone());

        let result = block_on(grid.update_item(paris));
        assert_eq!(
            result,
            Err(GridError::Validation("Region 9 does not exist".into()))
        );
        let list = notices.borrow();
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].message, "Region 9 does not exist");
        assert_eq!(list.items()[0].title, "Cities");
        assert_eq!(grid.editing(), None);
    }

    #[test]
    fn test_same_key_ignores_other_columns() {
        let fields = registry::fields(registry::CITIES).unwrap();
        let paris = row(json!({"city_id": 1, "city_name": "Paris"}));
        let renamed = row(json!({"city_id": 1, "city_name": "Lutetia"}));
        let lyon = row(json!({"city_id": 2, "city_name": "Paris"}));
        assert!(same_key(fields, &paris, &renamed));
        assert!(!same_key(fields, &paris, &lyon));
    }

    #[test]
    fn test_build_row_commits_by_descriptor() {
        let fields = registry::fields(registry::CITIES).unwrap();
        let draft: HashMap<String, String> = [
            ("city_id".to_string(), "4".to_string()),
            ("city_name".to_string(), "Berlin".to_string()),
            ("fg_region_id".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();
        let built = build_row(fields, &draft).unwrap();
        assert_eq!(
            Value::Object(built.clone()),
            json!({"city_id": 4, "city_name": "Berlin", "fg_region_id": 2})
        );

        assert_eq!(draft_from_row(fields, &built)["fg_region_id"], "2");

        let mut bad = draft.clone();
        bad.insert("fg_region_id".into(), "two".into());
        assert!(matches!(build_row(fields, &bad), Err(GridError::Commit(_))));
    }
}
