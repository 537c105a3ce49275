use axum::extract::{Path, Query};
use axum::Json;
use contracts::shared::registry;
use contracts::shared::row::{OldNew, PageQuery, PageResponse, Row};

use crate::domain::table_items::service;
use crate::shared::config;
use crate::shared::data::db::get_connection;
use crate::shared::error::ApiError;
use crate::system::auth::extractor::{AdminUser, CurrentUser};

fn resolve(segment: &str) -> Result<&'static str, ApiError> {
    registry::resolve_table(segment).ok_or_else(|| ApiError::UnknownTable(segment.to_string()))
}

/// GET /:table/items?page_index=N&page_size=M
pub async fn list_page(
    _user: CurrentUser,
    Path(table): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>, ApiError> {
    let table = resolve(&table)?;
    let page = service::load_page(get_connection(), table, query, config::max_page_size()).await?;
    Ok(Json(page))
}

/// POST /:table/items
pub async fn insert(
    _user: CurrentUser,
    Path(table): Path<String>,
    Json(row): Json<Row>,
) -> Result<Json<Row>, ApiError> {
    let table = resolve(&table)?;
    service::insert(get_connection(), table, row).await.map(Json)
}

/// PUT /:table/items, admins only
pub async fn update(
    _admin: AdminUser,
    Path(table): Path<String>,
    Json(item): Json<OldNew<Row>>,
) -> Result<Json<Row>, ApiError> {
    let table = resolve(&table)?;
    service::update(get_connection(), table, item).await.map(Json)
}

/// DELETE /:table/items, admins only
pub async fn delete(
    _admin: AdminUser,
    Path(table): Path<String>,
    Json(row): Json<Row>,
) -> Result<Json<Row>, ApiError> {
    let table = resolve(&table)?;
    service::delete(get_connection(), table, row).await.map(Json)
}
