use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;
const SECRET_KEY: &str = "jwt_secret";

static JWT_SECRET: OnceCell<String> = OnceCell::new();

pub fn generate_access_token(username: &str, is_admin: bool, secret: &str) -> Result<String> {
    let now = Utc::now();
    let exp = (now + chrono::Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    let claims = TokenClaims {
        sub: username.to_string(),
        is_admin,
        exp,
        iat: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

/// Checks the signature and expiry of `token`.
pub fn validate_token(token: &str, secret: &str) -> Result<TokenClaims> {
    let data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;
    Ok(data.claims)
}

/// 256 random bits, base64 encoded.
fn generate_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    general_purpose::STANDARD.encode(bytes)
}

/// Reads the signing secret from `sys_settings`, creating it on first start
/// so issued tokens survive a restart.
pub async fn load_or_create_secret(db: &DatabaseConnection) -> Result<String> {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "CREATE TABLE IF NOT EXISTS sys_settings (key TEXT NOT NULL PRIMARY KEY, value TEXT NOT NULL);"
            .to_string(),
    ))
    .await?;

    let row = db
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            [SECRET_KEY.into()],
        ))
        .await?;
    if let Some(row) = row {
        let secret: String = row.try_get("", "value")?;
        return Ok(secret);
    }

    let secret = generate_secret();
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_settings (key, value) VALUES (?, ?)",
        [SECRET_KEY.into(), secret.clone().into()],
    ))
    .await?;
    tracing::info!("Generated a new JWT secret");
    Ok(secret)
}

pub fn install_secret(secret: String) -> Result<()> {
    JWT_SECRET
        .set(secret)
        .map_err(|_| anyhow::anyhow!("JWT secret already installed"))
}

pub fn secret() -> Option<&'static str> {
    JWT_SECRET.get().map(String::as_str)
}
