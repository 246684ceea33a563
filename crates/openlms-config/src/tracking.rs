//! Event tracking settings.
//!
//! # Environment Variables
//!
//! - `TRACKING_SEGMENTIO_WEBHOOK_SECRET`: shared secret expected in the
//!   `key` query parameter of `/segmentio/event`; the webhook rejects every
//!   call while unset
//! - `TRACKING_SEGMENTIO_SOURCE_MAP`: JSON object mapping Segment library
//!   names to event sources
//! - `TRACKING_SEGMENTIO_ALLOWED_TYPES`: comma separated message types to accept
//! - `TRACKING_SEGMENTIO_DISALLOWED_SUBSTRING_NAMES`: comma separated
//!   substrings; events whose name contains one are dropped

use std::collections::HashMap;
use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackingConfig {
    pub segmentio_webhook_secret: Option<String>,
    pub segmentio_source_map: HashMap<String, String>,
    pub segmentio_allowed_types: Vec<String>,
    pub segmentio_disallowed_substring_names: Vec<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        let segmentio_source_map = [
            ("analytics-android", "mobile"),
            ("analytics-ios", "mobile"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            segmentio_webhook_secret: None,
            segmentio_source_map,
            segmentio_allowed_types: vec!["track".to_string()],
            segmentio_disallowed_substring_names: Vec::new(),
        }
    }
}

fn comma_separated(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl TrackingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            segmentio_webhook_secret: env::var("TRACKING_SEGMENTIO_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            segmentio_source_map: env::var("TRACKING_SEGMENTIO_SOURCE_MAP")
                .ok()
                .and_then(|raw| match serde_json::from_str(&raw) {
                    Ok(map) => Some(map),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring malformed TRACKING_SEGMENTIO_SOURCE_MAP");
                        None
                    }
                })
                .unwrap_or(defaults.segmentio_source_map),
            segmentio_allowed_types: env::var("TRACKING_SEGMENTIO_ALLOWED_TYPES")
                .map(|raw| comma_separated(&raw))
                .unwrap_or(defaults.segmentio_allowed_types),
            segmentio_disallowed_substring_names: env::var(
                "TRACKING_SEGMENTIO_DISALLOWED_SUBSTRING_NAMES",
            )
            .map(|raw| comma_separated(&raw))
            .unwrap_or(defaults.segmentio_disallowed_substring_names),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackingConfig::default();
        assert!(config.segmentio_webhook_secret.is_none());
        assert_eq!(
            config.segmentio_source_map.get("analytics-ios").map(String::as_str),
            Some("mobile")
        );
        assert_eq!(config.segmentio_allowed_types, vec!["track".to_string()]);
    }

    #[test]
    fn test_comma_separated() {
        assert_eq!(
            comma_separated(" Track, screen ,,"),
            vec!["track".to_string(), "screen".to_string()]
        );
    }
}
