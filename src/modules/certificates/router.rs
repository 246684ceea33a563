use axum::{Router, routing::get};

use super::controller::{get_certificate, list_certificates};
use crate::state::AppState;

pub fn init_certificates_router() -> Router<AppState> {
    Router::new()
        .route("/certificates/{username}", get(list_certificates))
        // Deprecated `ORG/COURSE/RUN` keys span several segments.
        .route(
            "/certificates/{username}/courses/{*course_id}",
            get(get_certificate),
        )
}
