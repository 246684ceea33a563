use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::instrument;

use openlms_config::TrackingConfig;
use openlms_core::AppError;
use openlms_models::{User, UserId, course_key_from_url};

use super::model::UserTrackParams;
use super::tracker::{EventContext, TrackingEvent};
use crate::store::CoursewareStore;

/// Request details copied into every event context.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub user: Option<User>,
    pub session: Option<String>,
    pub ip: Option<String>,
    pub agent: Option<String>,
    pub host: Option<String>,
    pub path: String,
}

impl RequestInfo {
    fn context(&self) -> EventContext {
        EventContext {
            user_id: self.user.as_ref().map(|u| u.id.to_string()),
            username: self
                .user
                .as_ref()
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            session: self.session.clone().unwrap_or_default(),
            ip: self.ip.clone().unwrap_or_default(),
            agent: self.agent.clone().unwrap_or_default(),
            host: self.host.clone().unwrap_or_default(),
            path: self.path.clone(),
            ..EventContext::default()
        }
    }
}

/// Reasons a Segment message is dropped. The webhook still answers 200.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentEventError {
    #[error("The request body is not a JSON object")]
    NotAnObject,
    #[error("Required context not found")]
    MissingContext,
    #[error("Required event name not found")]
    MissingName,
    #[error("Required user id not found")]
    MissingUserId,
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),
    #[error("Specified user does not exist")]
    UserNotFound,
    #[error("Required timestamp not found")]
    MissingTimestamp,
    #[error("Required receivedAt timestamp not found")]
    MissingReceivedAt,
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl SegmentEventError {
    /// Short label used for the rejection counter.
    pub fn reason(&self) -> &'static str {
        match self {
            SegmentEventError::NotAnObject => "not_an_object",
            SegmentEventError::MissingContext => "missing_context",
            SegmentEventError::MissingName => "missing_name",
            SegmentEventError::MissingUserId => "missing_user_id",
            SegmentEventError::InvalidUserId(_) => "invalid_user_id",
            SegmentEventError::UserNotFound => "user_not_found",
            SegmentEventError::MissingTimestamp => "missing_timestamp",
            SegmentEventError::MissingReceivedAt => "missing_received_at",
            SegmentEventError::InvalidTimestamp(_) => "invalid_timestamp",
        }
    }
}

/// What became of a Segment message.
#[derive(Debug)]
pub enum SegmentOutcome {
    Emitted(TrackingEvent),
    /// Filtered out by configuration: a type, library or name we do not take.
    Ignored(&'static str),
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, SegmentEventError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| SegmentEventError::InvalidTimestamp(raw.to_string()))
}

fn str_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

pub struct TrackService;

impl TrackService {
    /// Builds the event for a browser `/event` call.
    pub fn user_track_event(params: UserTrackParams, request: &RequestInfo) -> TrackingEvent {
        let event = serde_json::from_str::<Value>(&params.event)
            .unwrap_or(Value::String(params.event));

        let mut context = request.context();
        if let Some(course_key) = params.page.as_deref().and_then(course_key_from_url) {
            context.course_id = course_key.to_string();
            context.org_id = course_key.org().to_string();
        }
        context.page = params.page;

        TrackingEvent {
            name: params.event_type,
            event_source: "browser".to_string(),
            event,
            context,
            time: Utc::now(),
        }
    }

    /// Validates a Segment message and turns it into a tracking event.
    ///
    /// Store failures come back as `Err(AppError)`; malformed messages as
    /// `Ok(Err(SegmentEventError))`.
    #[instrument(skip(store, config, payload, request))]
    pub async fn segmentio_event(
        store: &dyn CoursewareStore,
        config: &TrackingConfig,
        payload: &Value,
        request: &RequestInfo,
    ) -> Result<Result<SegmentOutcome, SegmentEventError>, AppError> {
        let Some(message) = payload.as_object() else {
            return Ok(Err(SegmentEventError::NotAnObject));
        };

        let event_type = str_field(message, "type").unwrap_or_default().to_lowercase();
        if !config.segmentio_allowed_types.contains(&event_type) {
            return Ok(Ok(SegmentOutcome::Ignored("type")));
        }

        let Some(segment_context) = message.get("context").and_then(Value::as_object) else {
            return Ok(Err(SegmentEventError::MissingContext));
        };

        let library = segment_context
            .get("library")
            .and_then(|library| library.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let Some(event_source) = config.segmentio_source_map.get(library) else {
            return Ok(Ok(SegmentOutcome::Ignored("library")));
        };

        let Some(name) = str_field(message, "event") else {
            return Ok(Err(SegmentEventError::MissingName));
        };
        let lowered = name.to_lowercase();
        if config
            .segmentio_disallowed_substring_names
            .iter()
            .any(|disallowed| lowered.contains(disallowed.as_str()))
        {
            return Ok(Ok(SegmentOutcome::Ignored("name")));
        }

        let user_id = match message.get("userId") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Ok(Err(SegmentEventError::MissingUserId)),
        };
        let Ok(user_id) = user_id.parse::<UserId>() else {
            return Ok(Err(SegmentEventError::InvalidUserId(user_id)));
        };
        let Some(user) = store.user_by_id(user_id).await? else {
            return Ok(Err(SegmentEventError::UserNotFound));
        };

        let Some(timestamp) = str_field(message, "timestamp") else {
            return Ok(Err(SegmentEventError::MissingTimestamp));
        };
        let Some(received_at) = str_field(message, "receivedAt") else {
            return Ok(Err(SegmentEventError::MissingReceivedAt));
        };
        let time = match parse_timestamp(timestamp) {
            Ok(time) => time,
            Err(e) => return Ok(Err(e)),
        };
        let received_at = match parse_timestamp(received_at) {
            Ok(received_at) => received_at,
            Err(e) => return Ok(Err(e)),
        };

        let properties = message
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut context = RequestInfo {
            user: Some(user),
            ..request.clone()
        }
        .context();
        context.client = Some(Value::Object(segment_context.clone()));
        context.received_at = Some(received_at);
        if let Some(course_id) = properties
            .get("context")
            .and_then(|c| c.get("course_id"))
            .and_then(Value::as_str)
        {
            context.course_id = course_id.to_string();
            if let Ok(key) = course_id.parse::<openlms_models::CourseKey>() {
                context.org_id = key.org().to_string();
            }
        }

        Ok(Ok(SegmentOutcome::Emitted(TrackingEvent {
            name: name.to_string(),
            event_source: event_source.clone(),
            event: properties.get("data").cloned().unwrap_or(Value::Object(Map::new())),
            context,
            time,
        })))
    }
}
