use serde::{Deserialize, Serialize};

pub const LOGIN_PATH: &str = "/auth/login";
pub const CURRENT_USER_PATH: &str = "/auth/me";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    /// May update and delete rows
    pub is_admin: bool,
}

/// JWT claims of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username
    pub sub: String,
    pub is_admin: bool,
    pub exp: usize,
    pub iat: usize,
}

impl TokenClaims {
    pub fn user_info(&self) -> UserInfo {
        UserInfo {
            username: self.sub.clone(),
            is_admin: self.is_admin,
        }
    }
}
