//! List helpers: sorting the rows of the current page
use contracts::shared::row::Row;
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortState {
    pub field: String,
    pub ascending: bool,
}

impl SortState {
    /// Clicking the sorted column flips the direction, another column
    /// starts ascending.
    pub fn toggled(current: Option<&SortState>, field: &str) -> SortState {
        match current {
            Some(s) if s.field == field => SortState {
                field: field.to_string(),
                ascending: !s.ascending,
            },
            _ => SortState {
                field: field.to_string(),
                ascending: true,
            },
        }
    }
}

/// Numbers compare numerically, strings case-insensitively.
fn compare_present(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Value::Number(_), _) => Ordering::Less,
        (_, Value::Number(_)) => Ordering::Greater,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Sorts rows by one column; empty values always go last
pub fn sort_rows(rows: &mut [Row], field: &str, ascending: bool) {
    rows.sort_by(|a, b| {
        let a = a.get(field).filter(|v| !v.is_null());
        let b = b.get(field).filter(|v| !v.is_null());
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => {
                let cmp = compare_present(a, b);
                if ascending {
                    cmp
                } else {
                    cmp.reverse()
                }
            }
        }
    });
}

pub fn get_sort_indicator(current: Option<&SortState>, field: &str) -> &'static str {
    match current {
        Some(s) if s.field == field => {
            if s.ascending {
                " ▲"
            } else {
                " ▼"
            }
        }
        _ => " ⇅",
    }
}
