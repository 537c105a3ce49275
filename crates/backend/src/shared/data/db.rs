use crate::domain::table_items::{repository, seed};
use crate::shared::config::{self, Config};
use crate::system::auth::jwt;
use crate::system::users::{repository as users_repository, service as user_service};
use contracts::shared::registry;
use once_cell::sync::OnceCell;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

fn build_sqlite_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Opens the database, creates missing tables and optionally seeds them.
/// Also creates the configured users and loads the token signing secret.
pub async fn initialize_database(config: &Config) -> anyhow::Result<()> {
    let db_path = config::get_database_path(config)?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db_url = build_sqlite_url(&db_path);
    tracing::info!("Opening database {}", db_url);

    let mut opts = ConnectOptions::new(db_url);
    opts.sqlx_logging(false);
    let conn = Database::connect(opts).await?;

    for table in registry::tables() {
        repository::create_table(&conn, table).await?;
    }

    if config.database.seed {
        seed::insert_sample_data(&conn).await?;
    }

    users_repository::create_table(&conn).await?;
    user_service::ensure_users(&conn, &config.auth.users).await?;
    jwt::install_secret(jwt::load_or_create_secret(&conn).await?)?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}
