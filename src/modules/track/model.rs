use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use openlms_core::serde::deserialize_optional_string;

/// Browser event as sent to `/event`, either as query parameters or a form.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserTrackParams {
    #[serde(default)]
    pub event_type: String,
    /// JSON encoded payload. Anything that does not parse is kept as a string.
    #[serde(default)]
    pub event: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SegmentioQuery {
    /// Shared webhook secret.
    pub key: Option<String>,
}
