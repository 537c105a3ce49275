use axum::Json;
use contracts::system::auth::{LoginRequest, LoginResponse, UserInfo};

use crate::shared::data::db::get_connection;
use crate::shared::error::ApiError;
use crate::system::auth::extractor::CurrentUser;
use crate::system::auth::jwt;
use crate::system::users::service as user_service;

/// POST /auth/login
pub async fn login(Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>, ApiError> {
    let user = user_service::verify_credentials(get_connection(), &request.username, &request.password)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Failed login for {}", request.username);
            ApiError::Unauthorized("invalid username or password".into())
        })?;

    let secret = jwt::secret()
        .ok_or_else(|| ApiError::Unauthorized("authentication is not initialized".into()))?;
    let access_token = jwt::generate_access_token(&user.username, user.is_admin, secret)?;
    tracing::info!("User {} logged in", user.username);

    Ok(Json(LoginResponse {
        access_token,
        user: UserInfo {
            username: user.username,
            is_admin: user.is_admin,
        },
    }))
}

/// GET /auth/me
pub async fn current_user(CurrentUser(claims): CurrentUser) -> Json<UserInfo> {
    Json(claims.user_info())
}
