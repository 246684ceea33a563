//! Authentication DTOs and stored credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::UserId;

/// Login request with username and password.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 150))]
    #[schema(example = "staff")]
    pub username: String,
    #[validate(length(min = 1))]
    #[schema(example = "edx")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
}

/// Successful login. The session cookie is sent alongside in `Set-Cookie`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "JWT")]
    pub token_type: String,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: i64,
    pub user: LoginUser,
}

/// An OAuth2 opaque access token. Only the SHA-256 digest is stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AccessTokenRecord {
    pub token_hash: String,
    pub user_id: UserId,
    /// Space separated scopes.
    pub scope: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessTokenRecord {
    pub fn scopes(&self) -> Vec<String> {
        self.scope.split_whitespace().map(str::to_string).collect()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SessionRecord {
    pub session_hash: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
