use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, QueryResult, Statement};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS users_info (
    username TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    last_appearance TEXT,
    PRIMARY KEY (username)
);";

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub last_appearance: Option<DateTime<Utc>>,
}

fn from_row(row: &QueryResult) -> Result<UserRecord, DbErr> {
    let last_appearance: Option<String> = row.try_get("", "last_appearance")?;
    let is_admin: i64 = row.try_get("", "is_admin")?;
    Ok(UserRecord {
        username: row.try_get("", "username")?,
        password_hash: row.try_get("", "password_hash")?,
        is_admin: is_admin != 0,
        last_appearance: last_appearance
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

pub async fn create_table(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        CREATE_TABLE_SQL.to_string(),
    ))
    .await?;
    Ok(())
}

pub async fn get_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<UserRecord>, DbErr> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT username, password_hash, is_admin, last_appearance FROM users_info WHERE username = ?",
            [username.into()],
        ))
        .await?;
    row.as_ref().map(from_row).transpose()
}

pub async fn insert(
    db: &DatabaseConnection,
    username: &str,
    password_hash: &str,
    is_admin: bool,
) -> Result<(), DbErr> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO users_info (username, password_hash, is_admin, last_appearance) VALUES (?, ?, ?, NULL)",
        [
            username.into(),
            password_hash.into(),
            i64::from(is_admin).into(),
        ],
    ))
    .await?;
    Ok(())
}

/// Records that the user made a request at `at`.
pub async fn touch(db: &DatabaseConnection, username: &str, at: DateTime<Utc>) -> Result<(), DbErr> {
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE users_info SET last_appearance = ? WHERE username = ?",
        [at.to_rfc3339().into(), username.into()],
    ))
    .await?;
    Ok(())
}
