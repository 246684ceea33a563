//! Administrative operations behind the CLI subcommands.
//!
//! Everything goes through [`CoursewareStore`] so the same code runs against
//! Postgres and the in-memory store.

use chrono::{Duration, Utc};
use clap::ValueEnum;

use openlms::modules::enrollments::EnrollmentService;
use openlms::store::CoursewareStore;
use openlms_auth::{AccessGrant, create_access_token, generate_token, hash_token};
use openlms_config::JwtConfig;
use openlms_core::{AppError, hash_password};
use openlms_models::{
    AccessTokenRecord, CourseKey, CourseMode, Enrollment, User, UserId, UserProfile,
};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub year_of_birth: Option<i32>,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Creates an active user with a profile.
pub async fn create_user(store: &dyn CoursewareStore, new_user: NewUser) -> Result<User, AppError> {
    if store.user_by_username(&new_user.username).await?.is_some() {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "User {} already exists",
            new_user.username
        )));
    }

    let user = User {
        id: UserId::new(),
        username: new_user.username,
        email: new_user.email,
        password_hash: hash_password(&new_user.password)?,
        is_staff: new_user.is_staff,
        is_superuser: new_user.is_superuser,
        is_active: true,
        date_joined: Utc::now(),
    };
    store.insert_user(&user).await?;
    store
        .upsert_profile(&UserProfile {
            user_id: user.id,
            name: new_user.name,
            year_of_birth: new_user.year_of_birth,
        })
        .await?;

    Ok(user)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TokenKind {
    /// Signed JWT carrying scopes and filters.
    Jwt,
    /// Opaque OAuth2 bearer token, stored hashed.
    Opaque,
}

#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub kind: TokenKind,
    pub scopes: Vec<String>,
    pub filters: Vec<String>,
    /// Issue the JWT as a restricted application.
    pub restricted: bool,
    /// Lifetime of opaque tokens in seconds. JWTs use the configured expiry.
    pub expires_in: i64,
}

async fn user_named(store: &dyn CoursewareStore, username: &str) -> Result<User, AppError> {
    store
        .user_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User {username} not found")))
}

/// Issues an access token for `username` and returns the raw token.
pub async fn issue_token(
    store: &dyn CoursewareStore,
    jwt_config: &JwtConfig,
    username: &str,
    request: TokenRequest,
) -> Result<String, AppError> {
    let user = user_named(store, username).await?;

    match request.kind {
        TokenKind::Jwt => create_access_token(
            user.id.into_inner(),
            &user.username,
            &user.email,
            user.is_staff,
            AccessGrant {
                scopes: request.scopes,
                filters: request.filters,
                is_restricted: request.restricted,
            },
            jwt_config,
        ),
        TokenKind::Opaque => {
            let token = generate_token();
            store
                .insert_access_token(&AccessTokenRecord {
                    token_hash: hash_token(&token),
                    user_id: user.id,
                    scope: request.scopes.join(" "),
                    expires_at: Utc::now() + Duration::seconds(request.expires_in),
                })
                .await?;
            Ok(token)
        }
    }
}

fn parse_course(course_id: &str) -> Result<CourseKey, AppError> {
    course_id.parse().map_err(AppError::bad_request)
}

pub async fn enroll(
    store: &dyn CoursewareStore,
    username: &str,
    course_id: &str,
    mode: CourseMode,
) -> Result<Enrollment, AppError> {
    let user = user_named(store, username).await?;
    EnrollmentService::enroll(store, user.id, &parse_course(course_id)?, mode).await
}

pub async fn unenroll(
    store: &dyn CoursewareStore,
    username: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, AppError> {
    let user = user_named(store, username).await?;
    EnrollmentService::unenroll(store, user.id, &parse_course(course_id)?).await
}
