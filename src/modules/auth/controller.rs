use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use openlms_core::AppError;
use openlms_models::{LoginRequest, LoginResponse};

use super::service::AuthService;
use crate::modules::certificates::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Login with username and password
///
/// Returns a JWT access token and sets the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Response, AppError> {
    let outcome = AuthService::login_user(
        state.store.as_ref(),
        dto,
        &state.jwt_config,
        &state.session_config,
    )
    .await?;

    let cookie = HeaderValue::from_str(&state.session_config.set_cookie_header(&outcome.session_key))
        .map_err(AppError::internal)?;

    let mut response = Json(outcome.response).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}
