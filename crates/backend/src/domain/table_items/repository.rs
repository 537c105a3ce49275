//! SQL over the registered tables. Column and table names always come from
//! the field registry; values are bound as statement parameters.

use contracts::shared::field::{FieldDescriptor, FieldKind};
use contracts::shared::registry;
use contracts::shared::row::{PageQuery, Row};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, FromQueryResult, JsonValue,
    Statement, Value,
};

fn stmt(sql: String, values: Vec<Value>) -> Statement {
    Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values)
}

fn column_list(table: &str) -> String {
    registry::data_fields(table)
        .iter()
        .map(|f| f.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_condition(table: &str) -> String {
    registry::key_fields(table)
        .iter()
        .map(|f| format!("{} = ?", f.name))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Converts a JSON cell to a bound value of the column's SQL type.
/// Rows are validated before they reach the repository, so a mismatching
/// value only ends up as NULL.
pub fn to_db_value(field: &FieldDescriptor, value: Option<&serde_json::Value>) -> Value {
    let value = value.filter(|v| !v.is_null());
    match field.kind {
        FieldKind::Number { integer: true } => Value::BigInt(value.and_then(|v| v.as_i64())),
        FieldKind::Number { integer: false } => Value::Double(value.and_then(|v| v.as_f64())),
        FieldKind::ForeignKey if field.is_numeric() => {
            Value::BigInt(value.and_then(|v| v.as_i64()))
        }
        _ => Value::String(value.and_then(|v| v.as_str()).map(|s| Box::new(s.to_string()))),
    }
}

fn row_values(table: &str, row: &Row) -> Vec<Value> {
    registry::data_fields(table)
        .into_iter()
        .map(|f| to_db_value(f, row.get(f.name)))
        .collect()
}

fn key_values(table: &str, row: &Row) -> Vec<Value> {
    registry::key_fields(table)
        .into_iter()
        .map(|f| to_db_value(f, row.get(f.name)))
        .collect()
}

/// `CREATE TABLE` statement derived from the registry.
pub fn create_table_sql(table: &str) -> String {
    let mut lines: Vec<String> = registry::data_fields(table)
        .iter()
        .map(|f| {
            let sql_type = match f.kind {
                FieldKind::Number { integer: true } => "INTEGER",
                FieldKind::Number { integer: false } => "REAL",
                FieldKind::ForeignKey if f.is_numeric() => "INTEGER",
                _ => "TEXT",
            };
            let not_null = if f.required { " NOT NULL" } else { "" };
            format!("    {} {}{}", f.name, sql_type, not_null)
        })
        .collect();

    let keys: Vec<&str> = registry::key_fields(table).iter().map(|f| f.name).collect();
    lines.push(format!("    PRIMARY KEY ({})", keys.join(", ")));

    for f in registry::data_fields(table) {
        if let Some(fk) = f.foreign_key {
            lines.push(format!(
                "    FOREIGN KEY ({}) REFERENCES {} ({})",
                f.name, fk.table, fk.column
            ));
        }
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        table,
        lines.join(",\n")
    )
}

pub async fn create_table(db: &DatabaseConnection, table: &str) -> Result<(), DbErr> {
    db.execute(stmt(create_table_sql(table), vec![])).await?;
    Ok(())
}

pub async fn count(db: &DatabaseConnection, table: &str) -> Result<u64, DbErr> {
    let row = db
        .query_one(stmt(format!("SELECT COUNT(*) AS cnt FROM {}", table), vec![]))
        .await?;
    let cnt: i64 = match row {
        Some(r) => r.try_get("", "cnt")?,
        None => 0,
    };
    Ok(cnt.max(0) as u64)
}

/// Rows of one page, ordered by the key columns.
pub async fn load_page(
    db: &DatabaseConnection,
    table: &str,
    query: PageQuery,
) -> Result<Vec<Row>, DbErr> {
    let order = registry::key_fields(table)
        .iter()
        .map(|f| f.name)
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT ? OFFSET ?",
        column_list(table),
        table,
        order
    );
    let limit = i64::try_from(query.page_size)
        .map_err(|_| DbErr::Custom(format!("page_size {} is out of range", query.page_size)))?;
    let offset = query
        .offset()
        .and_then(|o| i64::try_from(o).ok())
        .ok_or_else(|| DbErr::Custom(format!("page {} is out of range", query.page_index)))?;
    let values = vec![Value::BigInt(Some(limit)), Value::BigInt(Some(offset))];
    let rows = JsonValue::find_by_statement(stmt(sql, values))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        })
        .collect())
}

pub async fn insert(db: &DatabaseConnection, table: &str, row: &Row) -> Result<(), DbErr> {
    let fields = registry::data_fields(table);
    let placeholders = vec!["?"; fields.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        column_list(table),
        placeholders
    );
    db.execute(stmt(sql, row_values(table, row))).await?;
    Ok(())
}

/// Overwrites the row identified by the key columns of `old` with `new`.
/// Returns the number of rows changed.
pub async fn update(
    db: &DatabaseConnection,
    table: &str,
    old: &Row,
    new: &Row,
) -> Result<u64, DbErr> {
    let assignments = registry::data_fields(table)
        .iter()
        .map(|f| format!("{} = ?", f.name))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        assignments,
        key_condition(table)
    );
    let mut values = row_values(table, new);
    values.extend(key_values(table, old));
    let result = db.execute(stmt(sql, values)).await?;
    Ok(result.rows_affected())
}

pub async fn delete(db: &DatabaseConnection, table: &str, row: &Row) -> Result<u64, DbErr> {
    let sql = format!("DELETE FROM {} WHERE {}", table, key_condition(table));
    let result = db.execute(stmt(sql, key_values(table, row))).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::registry::{CITIES, CONTINENTS, REGIONS};
    use serde_json::json;

    #[test]
    fn test_create_table_sql_has_keys_and_references() {
        let sql = create_table_sql(CITIES);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS cities ("));
        assert!(sql.contains("city_id INTEGER NOT NULL"));
        assert!(sql.contains("city_name TEXT NOT NULL,"));
        assert!(sql.contains("fg_region_id INTEGER,"));
        assert!(sql.contains("PRIMARY KEY (city_id)"));
        assert!(sql.contains("FOREIGN KEY (fg_region_id) REFERENCES regions (region_id)"));
    }

    #[test]
    fn test_create_table_sql_leaves_references_nullable() {
        let sql = create_table_sql(REGIONS);
        for column in [
            "region_name TEXT NOT NULL",
            "population INTEGER NOT NULL",
            "area_m2 REAL NOT NULL",
            "climate TEXT NOT NULL",
            "fg_country_name TEXT,",
            "fg_centre_city_id INTEGER,",
        ] {
            assert!(sql.contains(column), "{} missing from {}", column, sql);
        }
    }

    #[test]
    fn test_to_db_value_follows_column_type() {
        let fields = registry::data_fields(CONTINENTS);
        let area = fields.iter().find(|f| f.name == "area_m2").unwrap();
        assert_eq!(to_db_value(area, Some(&json!(12))), Value::Double(Some(12.0)));
        assert_eq!(to_db_value(area, Some(&json!(null))), Value::Double(None));
        let name = fields.iter().find(|f| f.name == "name").unwrap();
        assert_eq!(
            to_db_value(name, Some(&json!("Asia"))),
            Value::String(Some(Box::new("Asia".to_string())))
        );
    }
}
