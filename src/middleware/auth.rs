use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::{TypedHeader, headers::Cookie};
use chrono::Utc;
use openlms_auth::{Claims, hash_token, looks_like_jwt, verify_token};
use openlms_core::AppError;
use openlms_models::{User, UserId};

use crate::metrics::track_authentication;
use crate::state::AppState;

/// How the current request proved who it is.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    Jwt(Claims),
    OAuth2 { scopes: Vec<String> },
    Session,
}

impl AuthMethod {
    pub fn name(&self) -> &'static str {
        match self {
            AuthMethod::Jwt(_) => "jwt",
            AuthMethod::OAuth2 { .. } => "oauth2",
            AuthMethod::Session => "session",
        }
    }
}

/// Extractor for an authenticated user.
///
/// Credentials are tried in order: JWT (`Authorization: JWT <token>` or a
/// JWT-shaped `Bearer` token), OAuth2 opaque bearer token, session cookie.
/// Inactive users are accepted. Rejects with 401 when no credentials are
/// present or the presented token is invalid.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub method: AuthMethod,
}

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn is_staff(&self) -> bool {
        self.user.is_staff
    }

    /// Claims of the JWT the request was authenticated with, if any.
    pub fn claims(&self) -> Option<&Claims> {
        match &self.method {
            AuthMethod::Jwt(claims) => Some(claims),
            _ => None,
        }
    }

    /// Authenticated with a JWT issued to a restricted application.
    pub fn is_jwt_restricted(&self) -> bool {
        self.claims().is_some_and(|claims| claims.is_restricted)
    }
}

enum Credentials {
    Jwt(String),
    OAuth2(String),
    Session(String),
}

fn credentials_from_parts(
    parts: &Parts,
    cookie: Option<&Cookie>,
    cookie_name: &str,
) -> Option<Credentials> {
    let authorization = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if let Some(value) = authorization {
        if let Some(token) = value.strip_prefix("JWT ") {
            return Some(Credentials::Jwt(token.trim().to_string()));
        }
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            return Some(if looks_like_jwt(token) {
                Credentials::Jwt(token.to_string())
            } else {
                Credentials::OAuth2(token.to_string())
            });
        }
    }

    cookie
        .and_then(|c| c.get(cookie_name))
        .map(|key| Credentials::Session(key.to_string()))
}

async fn user_for(state: &AppState, user_id: UserId) -> Result<User, AppError> {
    state
        .store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))
}

/// Runs the authentication chain.
///
/// `Ok(None)` means the request carried no usable credentials. A session
/// cookie that matches no live session counts as no credentials; a bad
/// token is an error.
pub async fn authenticate(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Option<AuthUser>, AppError> {
    let cookie = TypedHeader::<Cookie>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|TypedHeader(cookie)| cookie);

    let Some(credentials) =
        credentials_from_parts(parts, cookie.as_ref(), &state.session_config.cookie_name)
    else {
        return Ok(None);
    };

    let now = Utc::now();
    let result = match credentials {
        Credentials::Jwt(token) => {
            let claims = verify_token(&token, &state.jwt_config)?;
            let user_id: UserId = claims
                .sub
                .parse()
                .map_err(|_| AppError::unauthorized("Invalid user ID in token"))?;
            let user = user_for(state, user_id).await?;
            Some(AuthUser {
                user,
                method: AuthMethod::Jwt(claims),
            })
        }
        Credentials::OAuth2(token) => {
            let record = state
                .store
                .access_token(&hash_token(&token))
                .await?
                .filter(|record| !record.is_expired(now))
                .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;
            let user = user_for(state, record.user_id).await?;
            Some(AuthUser {
                user,
                method: AuthMethod::OAuth2 {
                    scopes: record.scopes(),
                },
            })
        }
        Credentials::Session(key) => {
            match state
                .store
                .session(&hash_token(&key))
                .await?
                .filter(|session| !session.is_expired(now))
            {
                Some(session) => state
                    .store
                    .user_by_id(session.user_id)
                    .await?
                    .map(|user| AuthUser {
                        user,
                        method: AuthMethod::Session,
                    }),
                None => None,
            }
        }
    };

    if let Some(auth_user) = &result {
        track_authentication(auth_user.method.name());
    }
    Ok(result)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
            .await?
            .ok_or_else(|| AppError::unauthorized("Authentication credentials were not provided."))
    }
}

/// Like [`AuthUser`] but never rejects: anonymous or badly authenticated
/// requests yield `None`.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await {
            Ok(user) => Ok(MaybeAuthUser(user)),
            Err(e) => {
                tracing::debug!(error = %e.error, "ignoring invalid credentials");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}
