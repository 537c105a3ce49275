use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use contracts::system::auth::TokenClaims;
use sea_orm::DatabaseConnection;

use super::jwt;
use crate::shared::config;
use crate::shared::data::db::get_connection;
use crate::shared::error::ApiError;
use crate::system::users::service as user_service;

/// Any logged-in user. Usage: `async fn handler(CurrentUser(claims): CurrentUser)`.
pub struct CurrentUser(pub TokenClaims);

/// A logged-in user with admin rights.
pub struct AdminUser(pub TokenClaims);

fn unauthorized(reason: &str) -> ApiError {
    ApiError::Unauthorized(reason.to_string())
}

/// Claims of the `Authorization: Bearer <token>` header.
///
/// Everything here is checked from the token alone, so a request is turned
/// away before any database work.
pub fn claims_from_header(
    header: Option<&str>,
    secret: &str,
    require_admin: bool,
) -> Result<TokenClaims, ApiError> {
    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("missing bearer token"))?;
    let claims = jwt::validate_token(token, secret).map_err(|e| unauthorized(&e.to_string()))?;
    if require_admin && !claims.is_admin {
        return Err(unauthorized("admin rights required"));
    }
    Ok(claims)
}

/// Checks that the user still exists, is idle for less than `idle` and, for
/// admin-only requests, still has admin rights.
pub async fn check_session(
    db: &DatabaseConnection,
    claims: TokenClaims,
    require_admin: bool,
    idle: Duration,
) -> Result<TokenClaims, ApiError> {
    let user = user_service::continue_session(db, &claims.sub, idle, Utc::now())
        .await?
        .ok_or_else(|| unauthorized("session expired, log in again"))?;
    if require_admin && !user.is_admin {
        return Err(unauthorized("admin rights required"));
    }
    Ok(claims)
}

async fn authenticate(parts: &Parts, require_admin: bool) -> Result<TokenClaims, ApiError> {
    let secret = jwt::secret().ok_or_else(|| unauthorized("authentication is not initialized"))?;
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let claims = claims_from_header(header, secret, require_admin)?;
    check_session(get_connection(), claims, require_admin, config::session_idle()).await
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts, false).await.map(CurrentUser)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts, true).await.map(AdminUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::UserSeed;
    use crate::system::users::repository;
    use sea_orm::{ConnectOptions, Database};

    const SECRET: &str = "test-secret";

    fn bearer(username: &str, is_admin: bool) -> String {
        format!(
            "Bearer {}",
            jwt::generate_access_token(username, is_admin, SECRET).unwrap()
        )
    }

    fn is_unauthorized<T>(result: &Result<T, ApiError>) -> bool {
        matches!(result, Err(ApiError::Unauthorized(_)))
    }

    #[test]
    fn test_missing_or_malformed_header_is_unauthorized() {
        assert!(is_unauthorized(&claims_from_header(None, SECRET, false)));
        assert!(is_unauthorized(&claims_from_header(Some("Bearer "), SECRET, false)));
        assert!(is_unauthorized(&claims_from_header(Some("Basic YWRtaW4="), SECRET, false)));
        assert!(is_unauthorized(&claims_from_header(Some("Bearer junk"), SECRET, false)));
    }

    #[test]
    fn test_non_admin_token_is_refused_for_admin_requests() {
        let guest = bearer("guest", false);
        assert!(claims_from_header(Some(&guest), SECRET, false).is_ok());
        assert!(is_unauthorized(&claims_from_header(Some(&guest), SECRET, true)));

        let admin = bearer("admin", true);
        let claims = claims_from_header(Some(&admin), SECRET, true).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[tokio::test]
    async fn test_session_check_uses_stored_user() {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        repository::create_table(&db).await.unwrap();
        user_service::ensure_users(
            &db,
            &[UserSeed {
                username: "demoted".into(),
                password: "pw".into(),
                is_admin: false,
            }],
        )
        .await
        .unwrap();
        let idle = Duration::minutes(5);

        // token still says admin, the stored user does not
        let claims = claims_from_header(Some(&bearer("demoted", true)), SECRET, true).unwrap();

        // not logged in yet
        assert!(is_unauthorized(
            &check_session(&db, claims.clone(), false, idle).await
        ));

        user_service::verify_credentials(&db, "demoted", "pw")
            .await
            .unwrap()
            .unwrap();
        assert!(check_session(&db, claims.clone(), false, idle).await.is_ok());
        assert!(is_unauthorized(&check_session(&db, claims, true, idle).await));
    }
}
