use serde::{Deserialize, Serialize};

/// Untyped row: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// HTTP status the server uses for a domain validation failure.
pub const VALIDATION_FAILURE_STATUS: u16 = 278;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Path of the CRUD endpoint of `table`.
pub fn items_path(table: &str) -> String {
    format!("/{}/items", table)
}

/// Query of `GET /<table>/items`. `page_index` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageQuery {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// Number of rows skipped before this page, `None` when it does not fit in a `u64`.
    pub fn offset(&self) -> Option<u64> {
        let skipped = (self.page_index.saturating_sub(1) as u64).checked_mul(self.page_size as u64)?;
        Some(skipped)
    }
}

/// Number of pages needed for `items_count` rows.
pub fn page_count(items_count: u64, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    (items_count as usize).div_ceil(page_size)
}

/// Response of `GET /<table>/items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "itemsCount")]
    pub items_count: u64,
    pub data: Vec<Row>,
}

impl PageResponse {
    pub fn total_pages(&self, page_size: usize) -> usize {
        page_count(self.items_count, page_size)
    }
}

/// Body of `PUT /<table>/items`: the row as it was loaded and as edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OldNew<T> {
    pub old: T,
    pub new: T,
}

/// Body sent along with [`VALIDATION_FAILURE_STATUS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub error_msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_response_wire_names() {
        let page: PageResponse =
            serde_json::from_value(json!({"itemsCount": 21, "data": [{"name": "Asia"}]})).unwrap();
        assert_eq!(page.items_count, 21);
        assert_eq!(page.data[0]["name"], "Asia");
        assert_eq!(page.total_pages(10), 3);
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page_count(20, 10), 2);
        assert_eq!(page_count(0, 10), 0);
    }

    #[test]
    fn test_page_query_offset() {
        assert_eq!(PageQuery::new(1, 10).offset(), Some(0));
        assert_eq!(PageQuery::new(3, 10).offset(), Some(20));
        assert_eq!(PageQuery::new(0, 10).offset(), Some(0));
    }

    #[test]
    fn test_page_query_offset_overflow() {
        assert_eq!(PageQuery::new(usize::MAX / 2, 10).offset(), None);
        assert_eq!(
            PageQuery::new(usize::MAX / 10 + 1, 10).offset(),
            Some((usize::MAX / 10) as u64 * 10)
        );
        assert_eq!(PageQuery::new(usize::MAX, 1).offset(), Some(usize::MAX as u64 - 1));
    }

    #[test]
    fn test_items_path() {
        assert_eq!(items_path("cities"), "/cities/items");
    }
}
