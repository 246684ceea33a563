//! Proctoring backend configuration.
//!
//! `PROCTORING_BACKENDS` holds a JSON object keyed by backend name:
//!
//! ```text
//! PROCTORING_BACKENDS='{"software_secure": {}, "mock_proctoring_allow_honor_mode": {"allow_honor_mode": true}}'
//! ```
//!
//! Unknown keys inside a backend entry are kept in `options` so the
//! configuration round-trips.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProctoringBackendConfig {
    /// Learners enrolled in honor mode may take proctored exams on this backend.
    #[serde(default)]
    pub allow_honor_mode: bool,
    #[serde(flatten)]
    pub options: HashMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProctoringConfig {
    pub backends: HashMap<String, ProctoringBackendConfig>,
}

impl ProctoringConfig {
    pub fn from_env() -> Self {
        match env::var("PROCTORING_BACKENDS") {
            Ok(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring malformed PROCTORING_BACKENDS");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            backends: serde_json::from_str(raw)?,
        })
    }

    pub fn with_backend(
        mut self,
        name: impl Into<String>,
        backend: ProctoringBackendConfig,
    ) -> Self {
        self.backends.insert(name.into(), backend);
        self
    }

    pub fn backend(&self, name: &str) -> Option<&ProctoringBackendConfig> {
        self.backends.get(name)
    }

    /// Whether the named backend lets honor-mode learners take proctored exams.
    pub fn allows_honor_mode(&self, name: &str) -> bool {
        self.backend(name).is_some_and(|b| b.allow_honor_mode)
    }
}
