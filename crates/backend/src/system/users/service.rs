use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

use super::repository::{self, UserRecord};
use crate::shared::config::UserSeed;
use crate::system::auth::password;

/// Returns the user when the password matches, and starts its session.
pub async fn verify_credentials(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> anyhow::Result<Option<UserRecord>> {
    let Some(mut user) = repository::get_by_username(db, username).await? else {
        return Ok(None);
    };
    if !password::verify_password(password, &user.password_hash)? {
        return Ok(None);
    }
    let now = Utc::now();
    repository::touch(db, &user.username, now).await?;
    user.last_appearance = Some(now);
    Ok(Some(user))
}

/// Returns the user if its session is still alive at `now` and extends it.
///
/// A session is alive while the previous request is less than `idle` ago.
/// A user that never logged in, or no longer exists, has no session.
pub async fn continue_session(
    db: &DatabaseConnection,
    username: &str,
    idle: Duration,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<UserRecord>> {
    let Some(mut user) = repository::get_by_username(db, username).await? else {
        return Ok(None);
    };
    match user.last_appearance {
        Some(last) if now - last <= idle => {}
        _ => {
            tracing::info!("Session of {} expired", username);
            return Ok(None);
        }
    }
    repository::touch(db, &user.username, now).await?;
    user.last_appearance = Some(now);
    Ok(Some(user))
}

/// Creates the configured accounts that do not exist yet.
pub async fn ensure_users(db: &DatabaseConnection, users: &[UserSeed]) -> anyhow::Result<()> {
    for seed in users {
        if repository::get_by_username(db, &seed.username).await?.is_some() {
            continue;
        }
        let hash = password::hash_password(&seed.password)?;
        repository::insert(db, &seed.username, &hash, seed.is_admin).await?;
        tracing::info!("Created user {} (admin: {})", seed.username, seed.is_admin);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database};

    async fn memory_db() -> DatabaseConnection {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        repository::create_table(&db).await.unwrap();
        db
    }

    fn seeds() -> Vec<UserSeed> {
        vec![
            UserSeed {
                username: "admin".into(),
                password: "secret".into(),
                is_admin: true,
            },
            UserSeed {
                username: "guest".into(),
                password: "guest".into(),
                is_admin: false,
            },
        ]
    }

    #[tokio::test]
    async fn test_ensure_users_is_idempotent() {
        let db = memory_db().await;
        ensure_users(&db, &seeds()).await.unwrap();
        ensure_users(&db, &seeds()).await.unwrap();

        let admin = repository::get_by_username(&db, "admin").await.unwrap().unwrap();
        assert!(admin.is_admin);
        assert_ne!(admin.password_hash, "secret");
        assert_eq!(admin.last_appearance, None);
        let guest = repository::get_by_username(&db, "guest").await.unwrap().unwrap();
        assert!(!guest.is_admin);
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let db = memory_db().await;
        ensure_users(&db, &seeds()).await.unwrap();

        let admin = verify_credentials(&db, "admin", "secret").await.unwrap();
        assert!(admin.and_then(|u| u.last_appearance).is_some());
        assert!(verify_credentials(&db, "admin", "wrong").await.unwrap().is_none());
        assert!(verify_credentials(&db, "nobody", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_expires_after_idle_time() {
        let db = memory_db().await;
        ensure_users(&db, &seeds()).await.unwrap();
        let idle = Duration::minutes(5);
        let start = Utc::now();

        // never logged in
        assert!(continue_session(&db, "guest", idle, start).await.unwrap().is_none());

        repository::touch(&db, "guest", start).await.unwrap();
        let later = start + Duration::minutes(4);
        assert!(continue_session(&db, "guest", idle, later).await.unwrap().is_some());

        // the request above extended the session
        let still = later + Duration::minutes(4);
        assert!(continue_session(&db, "guest", idle, still).await.unwrap().is_some());

        let too_late = still + Duration::minutes(6);
        assert!(continue_session(&db, "guest", idle, too_late).await.unwrap().is_none());
        assert!(continue_session(&db, "nobody", idle, start).await.unwrap().is_none());
    }
}
