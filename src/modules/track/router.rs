use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{segmentio_event, user_track_body, user_track_query};
use crate::state::AppState;

pub fn init_track_router() -> Router<AppState> {
    Router::new()
        .route("/event", get(user_track_query).post(user_track_body))
        .route("/segmentio/event", post(segmentio_event))
}
