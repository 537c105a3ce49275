use super::repository;
use crate::shared::error::ApiError;
use contracts::shared::field::{FieldDescriptor, FieldKind};
use contracts::shared::registry;
use contracts::shared::row::{OldNew, PageQuery, PageResponse, Row};
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use serde_json::Value;

fn type_matches(field: &FieldDescriptor, value: &Value) -> bool {
    if value.is_null() {
        return true;
    }
    match field.kind {
        FieldKind::Text => value.is_string(),
        FieldKind::Number { integer: true } => value.is_i64(),
        FieldKind::Number { integer: false } => value.is_number(),
        FieldKind::ForeignKey if field.is_numeric() => value.is_i64(),
        FieldKind::ForeignKey => value.is_string(),
        FieldKind::Control => false,
    }
}

/// Checks an incoming row against the table descriptors. Only the key has
/// to be present; use [`validate_complete_row`] for rows that get stored.
pub fn validate_row(table: &str, row: &Row) -> Result<(), ApiError> {
    for name in row.keys() {
        if registry::find_field(table, name).is_none() {
            return Err(ApiError::Validation(format!(
                "Unknown column '{}' in {}",
                name, table
            )));
        }
    }

    for field in registry::data_fields(table) {
        let value = row.get(field.name).unwrap_or(&Value::Null);
        if field.key && value.is_null() {
            return Err(ApiError::Validation(format!(
                "{} is required",
                field.title
            )));
        }
        if !type_matches(field, value) {
            return Err(ApiError::Validation(format!(
                "{} has a value of the wrong type: {}",
                field.title, value
            )));
        }
    }
    Ok(())
}

/// Like [`validate_row`], and every required column holds a value.
pub fn validate_complete_row(table: &str, row: &Row) -> Result<(), ApiError> {
    validate_row(table, row)?;
    for field in registry::data_fields(table) {
        if field.required && row.get(field.name).map_or(true, Value::is_null) {
            return Err(ApiError::Validation(format!(
                "{} is required",
                field.title
            )));
        }
    }
    Ok(())
}

pub fn validate_page(query: PageQuery, max_page_size: usize) -> Result<(), ApiError> {
    if query.page_index < 1 {
        return Err(ApiError::BadRequest("page_index starts at 1".into()));
    }
    if query.page_size < 1 || query.page_size > max_page_size {
        return Err(ApiError::BadRequest(format!(
            "page_size must be within 1..={}",
            max_page_size
        )));
    }
    let fits = query.offset().is_some_and(|offset| i64::try_from(offset).is_ok());
    if !fits {
        return Err(ApiError::BadRequest(format!(
            "page_index {} is out of range",
            query.page_index
        )));
    }
    Ok(())
}

/// Turns constraint violations into messages the user can act on.
fn map_db_error(table: &str, err: DbErr) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::Validation(format!(
            "A row with the same key already exists in {}",
            table
        )),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ApiError::Validation(format!(
            "A referenced row does not exist, or other rows still reference this row of {}",
            table
        )),
        _ => ApiError::Database(err),
    }
}

pub async fn load_page(
    db: &DatabaseConnection,
    table: &str,
    query: PageQuery,
    max_page_size: usize,
) -> Result<PageResponse, ApiError> {
    validate_page(query, max_page_size)?;
    let items_count = repository::count(db, table).await?;
    let data = repository::load_page(db, table, query).await?;
    Ok(PageResponse { items_count, data })
}

pub async fn insert(db: &DatabaseConnection, table: &str, row: Row) -> Result<Row, ApiError> {
    validate_complete_row(table, &row)?;
    repository::insert(db, table, &row)
        .await
        .map_err(|e| map_db_error(table, e))?;
    tracing::info!("Inserted row into {}", table);
    Ok(row)
}

/// Matches the stored row by the key of `old` and replaces it with `new`.
pub async fn update(
    db: &DatabaseConnection,
    table: &str,
    item: OldNew<Row>,
) -> Result<Row, ApiError> {
    validate_row(table, &item.old)?;
    validate_complete_row(table, &item.new)?;
    let changed = repository::update(db, table, &item.old, &item.new)
        .await
        .map_err(|e| map_db_error(table, e))?;
    if changed == 0 {
        return Err(ApiError::Validation(format!(
            "The row no longer exists in {}; reload the page",
            table
        )));
    }
    tracing::info!("Updated {} row(s) in {}", changed, table);
    Ok(item.new)
}

pub async fn delete(db: &DatabaseConnection, table: &str, row: Row) -> Result<Row, ApiError> {
    validate_row(table, &row)?;
    let changed = repository::delete(db, table, &row)
        .await
        .map_err(|e| map_db_error(table, e))?;
    if changed == 0 {
        return Err(ApiError::Validation(format!(
            "The row no longer exists in {}; reload the page",
            table
        )));
    }
    tracing::info!("Deleted {} row(s) from {}", changed, table);
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::registry::{CITIES, CONTINENTS, COUNTRIES, REGIONS};
    use sea_orm::{ConnectOptions, Database};
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    async fn memory_db() -> DatabaseConnection {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        for table in registry::tables() {
            repository::create_table(&db, table).await.unwrap();
        }
        db
    }

    fn is_validation(result: &Result<Row, ApiError>) -> bool {
        matches!(result, Err(ApiError::Validation(_)))
    }

    #[test]
    fn test_validate_row_rejects_unknown_column_and_wrong_type() {
        let ok = row(json!({"name": "Asia", "area_m2": 44.5}));
        assert!(validate_row(CONTINENTS, &ok).is_ok());

        let unknown = row(json!({"name": "Asia", "color": "red"}));
        assert!(matches!(
            validate_row(CONTINENTS, &unknown),
            Err(ApiError::Validation(_))
        ));

        let wrong = row(json!({"city_id": "seven", "city_name": "Paris"}));
        assert!(matches!(
            validate_row(CITIES, &wrong),
            Err(ApiError::Validation(_))
        ));

        let no_key = row(json!({"area_m2": 1.0}));
        assert!(matches!(
            validate_row(CONTINENTS, &no_key),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_complete_row_needs_required_columns() {
        let key_only = row(json!({"city_id": 1}));
        assert!(validate_row(CITIES, &key_only).is_ok());
        assert!(matches!(
            validate_complete_row(CITIES, &key_only),
            Err(ApiError::Validation(_))
        ));

        let blank_name = row(json!({"city_id": 1, "city_name": null}));
        assert!(matches!(
            validate_complete_row(CITIES, &blank_name),
            Err(ApiError::Validation(_))
        ));

        let no_region = row(json!({"city_id": 1, "city_name": "Paris", "fg_region_id": null}));
        assert!(validate_complete_row(CITIES, &no_region).is_ok());
    }

    #[test]
    fn test_validate_page_bounds() {
        assert!(validate_page(PageQuery::new(1, 10), 100).is_ok());
        assert!(matches!(
            validate_page(PageQuery::new(0, 10), 100),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_page(PageQuery::new(1, 101), 100),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_huge_page_index_is_rejected() {
        let db = memory_db().await;
        insert(&db, CONTINENTS, row(json!({"name": "Asia", "area_m2": 44.5})))
            .await
            .unwrap();

        for page_index in [usize::MAX / 2, usize::MAX / 10 + 1, usize::MAX] {
            let result = load_page(&db, CONTINENTS, PageQuery::new(page_index, 10), 100).await;
            assert!(
                matches!(result, Err(ApiError::BadRequest(_))),
                "page_index {} was accepted",
                page_index
            );
        }

        let past_end = load_page(&db, CONTINENTS, PageQuery::new(1_000_000, 10), 100)
            .await
            .unwrap();
        assert!(past_end.data.is_empty());
    }

    #[tokio::test]
    async fn test_insert_then_load_page() {
        let db = memory_db().await;
        for (name, area) in [("Asia", 44.5), ("Europe", 10.2), ("Africa", 30.3)] {
            insert(&db, CONTINENTS, row(json!({"name": name, "area_m2": area})))
                .await
                .unwrap();
        }

        let first = load_page(&db, CONTINENTS, PageQuery::new(1, 2), 100)
            .await
            .unwrap();
        assert_eq!(first.items_count, 3);
        assert_eq!(first.data.len(), 2);
        assert_eq!(first.data[0]["name"], "Africa");

        let second = load_page(&db, CONTINENTS, PageQuery::new(2, 2), 100)
            .await
            .unwrap();
        assert_eq!(second.data.len(), 1);
        assert_eq!(second.data[0]["name"], "Europe");
    }

    #[tokio::test]
    async fn test_duplicate_key_is_validation_failure() {
        let db = memory_db().await;
        let asia = row(json!({"name": "Asia", "area_m2": 44.5}));
        insert(&db, CONTINENTS, asia.clone()).await.unwrap();
        let again = insert(&db, CONTINENTS, asia).await;
        assert!(is_validation(&again));
    }

    #[tokio::test]
    async fn test_missing_foreign_key_target_is_validation_failure() {
        let db = memory_db().await;
        let result = insert(
            &db,
            COUNTRIES,
            row(json!({"name": "Atlantis", "fg_continent_name": "Mu"})),
        )
        .await;
        assert!(is_validation(&result));
    }

    #[tokio::test]
    async fn test_update_matches_by_old_key() {
        let db = memory_db().await;
        let bavaria = json!({
            "region_id": 1,
            "region_name": "Bavaria",
            "population": 12000000,
            "area_m2": 70550.0,
            "climate": "temperate"
        });
        insert(&db, REGIONS, row(bavaria.clone())).await.unwrap();

        let missing_climate = update(
            &db,
            REGIONS,
            OldNew {
                old: row(bavaria.clone()),
                new: row(json!({"region_id": 1, "region_name": "Bavaria", "population": 1, "area_m2": 1.0})),
            },
        )
        .await;
        assert!(is_validation(&missing_climate));

        let updated = update(
            &db,
            REGIONS,
            OldNew {
                old: row(bavaria),
                new: row(json!({
                    "region_id": 2,
                    "region_name": "Bayern",
                    "population": 13000000,
                    "area_m2": 70550.0,
                    "climate": "temperate"
                })),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated["region_id"], 2);

        let page = load_page(&db, REGIONS, PageQuery::new(1, 10), 100)
            .await
            .unwrap();
        assert_eq!(page.items_count, 1);
        assert_eq!(page.data[0]["region_id"], 2);
        assert_eq!(page.data[0]["region_name"], "Bayern");
        assert_eq!(page.data[0]["population"], 13000000);

        let stale = update(
            &db,
            REGIONS,
            OldNew {
                old: row(json!({"region_id": 1})),
                new: row(json!({
                    "region_id": 1,
                    "region_name": "Bavaria",
                    "population": 1,
                    "area_m2": 1.0,
                    "climate": "alpine"
                })),
            },
        )
        .await;
        assert!(is_validation(&stale));
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_validation_failure() {
        let db = memory_db().await;
        insert(&db, CITIES, row(json!({"city_id": 1, "city_name": "Paris"})))
            .await
            .unwrap();
        delete(&db, CITIES, row(json!({"city_id": 1, "city_name": "Paris"})))
            .await
            .unwrap();
        let again = delete(&db, CITIES, row(json!({"city_id": 1}))).await;
        assert!(is_validation(&again));
    }
}
