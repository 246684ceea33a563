use chrono::{Duration, Utc};
use tracing::instrument;

use openlms_auth::{AccessGrant, create_access_token, generate_token, hash_token};
use openlms_config::{JwtConfig, SessionConfig};
use openlms_core::{AppError, verify_password};
use openlms_models::{LoginRequest, LoginResponse, LoginUser, SessionRecord};

use crate::metrics::{track_jwt_issued, track_user_login_failure, track_user_login_success};
use crate::store::CoursewareStore;

/// A successful login: the response body and the raw session key for the
/// cookie.
#[derive(Debug)]
pub struct LoginOutcome {
    pub response: LoginResponse,
    pub session_key: String,
}

pub struct AuthService;

impl AuthService {
    #[instrument(skip(store, dto, jwt_config, session_config), fields(username = %dto.username))]
    pub async fn login_user(
        store: &dyn CoursewareStore,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
        session_config: &SessionConfig,
    ) -> Result<LoginOutcome, AppError> {
        let invalid = || AppError::unauthorized("Invalid username or password");

        let Some(user) = store.user_by_username(&dto.username).await? else {
            track_user_login_failure("unknown_user");
            return Err(invalid());
        };

        if user.password_hash.is_empty() || !verify_password(&dto.password, &user.password_hash)? {
            track_user_login_failure("bad_password");
            return Err(invalid());
        }

        if !user.is_active {
            track_user_login_failure("inactive");
            return Err(AppError::unauthorized("This account is not active"));
        }

        let access_token = create_access_token(
            user.id.into_inner(),
            &user.username,
            &user.email,
            user.is_staff,
            AccessGrant::default(),
            jwt_config,
        )?;
        track_jwt_issued();

        let session_key = generate_token();
        store
            .insert_session(&SessionRecord {
                session_hash: hash_token(&session_key),
                user_id: user.id,
                expires_at: Utc::now() + Duration::seconds(session_config.cookie_age),
            })
            .await?;

        track_user_login_success();
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(LoginOutcome {
            response: LoginResponse {
                access_token,
                token_type: "JWT".to_string(),
                expires_in: jwt_config.access_token_expiry,
                user: LoginUser {
                    id: user.id,
                    username: user.username,
                    email: user.email,
                    is_staff: user.is_staff,
                },
            },
            session_key,
        })
    }
}
