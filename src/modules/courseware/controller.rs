use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use openlms_core::AppError;

use super::model::{PermissionQuery, PermissionResponse};
use super::rules::RuleContext;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Check a named permission for the current user
///
/// Unknown permission names are reported as not allowed.
#[utoipa::path(
    get,
    path = "/api/courseware/v1/permissions/{permission}",
    params(
        ("permission" = String, Path, description = "Permission name"),
        PermissionQuery
    ),
    responses(
        (status = 200, description = "Permission evaluated", body = PermissionResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Courseware"
)]
#[instrument(skip(state, auth), fields(user = %auth.username()))]
pub async fn check_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(permission): Path<String>,
    Query(query): Query<PermissionQuery>,
) -> Result<Json<PermissionResponse>, AppError> {
    let context = RuleContext::from(query);
    let allowed = state
        .rules
        .has_perm(&state, &auth.user, &permission, &context)
        .await?;

    Ok(Json(PermissionResponse {
        permission,
        course_id: context.course_id,
        allowed,
    }))
}
