use axum::http::{HeaderValue, Method, header};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::rate_limit::{auth_rate_limit, general_rate_limit};
use crate::modules::auth::init_auth_router;
use crate::modules::certificates::init_certificates_router;
use crate::modules::courseware::init_courseware_router;
use crate::modules::track::init_track_router;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let rate_limited = state.rate_limit_config.enabled;

    let mut auth_router = init_auth_router();
    if rate_limited {
        auth_router = auth_router
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_rate_limit));
    }

    let mut api = Router::new()
        .nest("/auth", auth_router)
        .nest("/certificates/v0", init_certificates_router())
        .nest("/courseware/v1", init_courseware_router());
    if rate_limited {
        api = api.route_layer(middleware::from_fn_with_state(
            state.clone(),
            general_rate_limit,
        ));
    }

    let mut tracking = init_track_router();
    if rate_limited {
        tracking = tracking.route_layer(middleware::from_fn_with_state(
            state.clone(),
            general_rate_limit,
        ));
    }

    Router::new()
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route("/health", get(health))
        .nest("/api", api)
        .merge(tracking)
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
