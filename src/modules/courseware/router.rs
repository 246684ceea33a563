use axum::{Router, routing::get};

use super::controller::check_permission;
use crate::state::AppState;

pub fn init_courseware_router() -> Router<AppState> {
    Router::new().route("/permissions/{permission}", get(check_permission))
}
