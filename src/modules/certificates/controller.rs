use std::sync::LazyLock;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use openlms_core::{AppError, permissions::CERTIFICATES_READ};
use openlms_models::CourseKey;

use super::model::{CertificateListItem, CertificateResponse};
use super::service::CertificateService;
use crate::metrics::{track_certificate_lookup, track_certificates_returned};
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::permissions::{Check, Condition, PermissionContext, require};
use crate::state::AppState;

pub const COURSE_ID_NOT_VALID: &str = "course_id_not_valid";
pub const NO_CERTIFICATE_FOR_USER: &str = "no_certificate_for_user";

const REQUIRED_SCOPES: &[&str] = &[CERTIFICATES_READ];

/// Staff or the user themselves, or a restricted application holding the
/// scope plus org and user filters that cover the request.
static DETAIL_ACCESS: LazyLock<Condition> = LazyLock::new(|| {
    Check::IsAuthenticated
        & ((Check::NotJwtRestrictedApplication & (Check::IsStaff | Check::IsUserInUrl))
            | (Check::JwtRestrictedApplication
                & Check::JwtHasScope
                & Check::JwtHasContentOrgFilterForRequestedCourse
                & Check::JwtHasUserFilterForRequestedUser))
});

/// Any user, or a restricted application holding the scope and a user
/// filter that covers the request. Who sees what is decided by the
/// target's profile visibility.
static LIST_ACCESS: LazyLock<Condition> = LazyLock::new(|| {
    Check::IsAuthenticated
        & (Check::NotJwtRestrictedApplication
            | (Check::JwtRestrictedApplication
                & Check::JwtHasScope
                & Check::JwtHasUserFilterForRequestedUser))
});

#[derive(ToSchema)]
pub struct ErrorCodeResponse {
    #[schema(example = "no_certificate_for_user")]
    pub error_code: String,
}

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Get a user's certificate in a course
#[utoipa::path(
    get,
    path = "/api/certificates/v0/certificates/{username}/courses/{course_id}",
    params(
        ("username" = String, Path, description = "Owner of the certificate"),
        ("course_id" = String, Path, description = "Course key, e.g. course-v1:edX+DemoX+Demo_Course")
    ),
    responses(
        (status = 200, description = "Certificate found", body = CertificateResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not allowed to read this certificate", body = ErrorResponse),
        (status = 404, description = "Invalid course id or no certificate", body = ErrorCodeResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Certificates"
)]
#[instrument(skip(state, auth))]
pub async fn get_certificate(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Path((username, course_id)): Path<(String, String)>,
) -> Result<Json<CertificateResponse>, AppError> {
    require(
        &DETAIL_ACCESS,
        &PermissionContext::new(auth.as_ref())
            .scopes(REQUIRED_SCOPES)
            .username(&username)
            .course_id(&course_id),
    )?;

    let Ok(course_key) = course_id.parse::<CourseKey>() else {
        warn!(%course_id, "course id is not valid");
        track_certificate_lookup("detail", "invalid_course");
        return Err(AppError::with_code(StatusCode::NOT_FOUND, COURSE_ID_NOT_VALID));
    };

    let summary = CertificateService::certificate_for_user(
        state.store.as_ref(),
        &state.certificates_config,
        &username,
        &course_key,
    )
    .await?;

    match summary {
        Some(summary) => {
            track_certificate_lookup("detail", "found");
            Ok(Json(summary.into()))
        }
        None => {
            track_certificate_lookup("detail", "missing");
            Err(AppError::with_code(
                StatusCode::NOT_FOUND,
                NO_CERTIFICATE_FOR_USER,
            ))
        }
    }
}

/// List a user's viewable certificates
///
/// Only passing certificates in courses that currently show certificates are
/// listed, oldest first. Callers who may not see the user's certificates get
/// an empty list.
#[utoipa::path(
    get,
    path = "/api/certificates/v0/certificates/{username}",
    params(
        ("username" = String, Path, description = "Owner of the certificates")
    ),
    responses(
        (status = 200, description = "Certificates visible to the caller", body = Vec<CertificateListItem>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not allowed to list certificates", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Certificates"
)]
#[instrument(skip(state, auth))]
pub async fn list_certificates(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Path(username): Path<String>,
) -> Result<Json<Vec<CertificateListItem>>, AppError> {
    require(
        &LIST_ACCESS,
        &PermissionContext::new(auth.as_ref())
            .scopes(REQUIRED_SCOPES)
            .username(&username),
    )?;
    let Some(requestor) = auth else {
        return Err(AppError::unauthorized(
            "Authentication credentials were not provided.",
        ));
    };

    let items = CertificateService::viewable_certificates(
        state.store.as_ref(),
        &state.certificates_config,
        &state.visibility_config,
        &requestor.user,
        &username,
        Utc::now(),
    )
    .await?;

    track_certificate_lookup("list", if items.is_empty() { "empty" } else { "found" });
    track_certificates_returned(items.len());
    Ok(Json(items))
}
