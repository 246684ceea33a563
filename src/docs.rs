use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use openlms_models::{LoginRequest, LoginResponse, LoginUser};

use crate::modules::certificates::controller::{ErrorCodeResponse, ErrorResponse};
use crate::modules::certificates::model::{CertificateListItem, CertificateResponse};
use crate::modules::courseware::model::PermissionResponse;
use crate::modules::track::model::UserTrackParams;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::certificates::controller::get_certificate,
        crate::modules::certificates::controller::list_certificates,
        crate::modules::courseware::controller::check_permission,
        crate::modules::track::controller::user_track_query,
        crate::modules::track::controller::user_track_body,
        crate::modules::track::controller::segmentio_event,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            LoginUser,
            CertificateResponse,
            CertificateListItem,
            PermissionResponse,
            UserTrackParams,
            ErrorResponse,
            ErrorCodeResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Username and password login"),
        (name = "Certificates", description = "Course certificates of a user"),
        (name = "Courseware", description = "Courseware permission checks"),
        (name = "Tracking", description = "Browser and Segment event tracking")
    ),
    info(
        title = "OpenLMS API",
        version = "0.1.0",
        description = "Course certificates, courseware permissions and event tracking for an online learning platform.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for expected in [
            "/api/auth/login",
            "/api/certificates/v0/certificates/{username}",
            "/api/certificates/v0/certificates/{username}/courses/{course_id}",
            "/api/courseware/v1/permissions/{permission}",
            "/event",
            "/segmentio/event",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }
}
