use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    Form, Json,
    body::Bytes,
    extract::{ConnectInfo, FromRequest, FromRequestParts, Query, Request, State},
    http::{Extensions, HeaderMap, StatusCode, header, request::Parts},
};
use axum_extra::{TypedHeader, headers::Cookie};
use tracing::{instrument, warn};

use openlms_auth::hash_token;
use openlms_core::AppError;

use super::model::{SegmentioQuery, UserTrackParams};
use super::service::{RequestInfo, SegmentOutcome, TrackService};
use crate::metrics::track_segment_rejected;
use crate::middleware::auth::MaybeAuthUser;
use crate::state::AppState;

/// The caller's address as recorded on events: the first `X-Forwarded-For`
/// hop, then `X-Real-IP`, then the socket peer. Only informational, so
/// client-supplied headers are acceptable here.
fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .or_else(|| {
            extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
}

/// Request details for event context. Never rejects.
pub struct TrackRequest(pub RequestInfo);

impl FromRequestParts<AppState> for TrackRequest {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeAuthUser(auth) = MaybeAuthUser::from_request_parts(parts, state).await?;

        let session = TypedHeader::<Cookie>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|TypedHeader(cookie)| {
                cookie
                    .get(&state.session_config.cookie_name)
                    .map(|key| hash_token(key)[..32].to_string())
            });

        let header_value = |name: header::HeaderName| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Ok(TrackRequest(RequestInfo {
            user: auth.map(|auth| auth.user),
            session,
            ip: client_ip(&parts.headers, &parts.extensions),
            agent: header_value(header::USER_AGENT),
            host: header_value(header::HOST),
            path: parts.uri.path().to_string(),
        }))
    }
}

/// Record a browser event sent as query parameters
#[utoipa::path(
    get,
    path = "/event",
    params(UserTrackParams),
    responses(
        (status = 200, description = "Event recorded", body = String)
    ),
    tag = "Tracking"
)]
#[instrument(skip(state, request))]
pub async fn user_track_query(
    State(state): State<AppState>,
    TrackRequest(request): TrackRequest,
    Query(params): Query<UserTrackParams>,
) -> &'static str {
    state
        .tracker
        .emit(TrackService::user_track_event(params, &request));
    "success"
}

/// Record a browser event sent as a form or JSON body
#[utoipa::path(
    post,
    path = "/event",
    request_body(content = UserTrackParams, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Event recorded", body = String),
        (status = 400, description = "Unreadable body")
    ),
    tag = "Tracking"
)]
#[instrument(skip(state, request, req))]
pub async fn user_track_body(
    State(state): State<AppState>,
    TrackRequest(request): TrackRequest,
    req: Request,
) -> Result<&'static str, AppError> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let params = if is_json {
        let Json(params) = Json::<UserTrackParams>::from_request(req, &state)
            .await
            .map_err(AppError::bad_request)?;
        params
    } else {
        let Form(params) = Form::<UserTrackParams>::from_request(req, &state)
            .await
            .map_err(AppError::bad_request)?;
        params
    };

    state
        .tracker
        .emit(TrackService::user_track_event(params, &request));
    Ok("success")
}

/// Receive a Segment webhook message
///
/// Messages that fail validation are logged and still acknowledged with 200.
#[utoipa::path(
    post,
    path = "/segmentio/event",
    params(SegmentioQuery),
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Message accepted"),
        (status = 401, description = "Missing or wrong webhook key")
    ),
    tag = "Tracking"
)]
#[instrument(skip(state, query, request, body))]
pub async fn segmentio_event(
    State(state): State<AppState>,
    Query(query): Query<SegmentioQuery>,
    TrackRequest(request): TrackRequest,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let authorized = match (&state.tracking_config.segmentio_webhook_secret, &query.key) {
        (Some(secret), Some(key)) => secret == key,
        _ => false,
    };
    if !authorized {
        track_segment_rejected("unauthorized");
        return Err(AppError::unauthorized("Invalid webhook key"));
    }

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "unable to parse segment message");
            track_segment_rejected("invalid_json");
            return Ok(StatusCode::OK);
        }
    };

    match TrackService::segmentio_event(
        state.store.as_ref(),
        &state.tracking_config,
        &payload,
        &request,
    )
    .await?
    {
        Ok(SegmentOutcome::Emitted(event)) => state.tracker.emit(event),
        Ok(SegmentOutcome::Ignored(reason)) => {
            tracing::debug!(reason, "segment message ignored");
        }
        Err(e) => {
            warn!(error = %e, "unable to process segment message");
            track_segment_rejected(e.reason());
        }
    }

    Ok(StatusCode::OK)
}
