//! Generated certificates as stored by the certificate generation pipeline.
//!
//! The API only reads these rows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use thiserror::Error;

use crate::course_key::CourseKey;
use crate::enrollments::CourseMode;
use crate::ids::{CertificateId, UserId};
use crate::sql::impl_text_type;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown certificate status: {0:?}")]
pub struct StatusParseError(pub String);

/// Certificate lifecycle state. Rows written by the generation pipeline
/// with a state unknown here decode to [`CertificateStatus::Other`], which
/// is never passing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertificateStatus {
    Deleted,
    Deleting,
    Downloadable,
    Error,
    Generating,
    Notpassing,
    Restricted,
    Unavailable,
    Auditing,
    AuditPassing,
    AuditNotpassing,
    Unverified,
    Invalidated,
    Requesting,
    Regenerating,
    Other(String),
}

impl CertificateStatus {
    pub const ALL: [CertificateStatus; 15] = [
        CertificateStatus::Deleted,
        CertificateStatus::Deleting,
        CertificateStatus::Downloadable,
        CertificateStatus::Error,
        CertificateStatus::Generating,
        CertificateStatus::Notpassing,
        CertificateStatus::Restricted,
        CertificateStatus::Unavailable,
        CertificateStatus::Auditing,
        CertificateStatus::AuditPassing,
        CertificateStatus::AuditNotpassing,
        CertificateStatus::Unverified,
        CertificateStatus::Invalidated,
        CertificateStatus::Requesting,
        CertificateStatus::Regenerating,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            CertificateStatus::Deleted => "deleted",
            CertificateStatus::Deleting => "deleting",
            CertificateStatus::Downloadable => "downloadable",
            CertificateStatus::Error => "error",
            CertificateStatus::Generating => "generating",
            CertificateStatus::Notpassing => "notpassing",
            CertificateStatus::Restricted => "restricted",
            CertificateStatus::Unavailable => "unavailable",
            CertificateStatus::Auditing => "auditing",
            CertificateStatus::AuditPassing => "audit_passing",
            CertificateStatus::AuditNotpassing => "audit_notpassing",
            CertificateStatus::Unverified => "unverified",
            CertificateStatus::Invalidated => "invalidated",
            CertificateStatus::Requesting => "requesting",
            CertificateStatus::Regenerating => "regenerating",
            CertificateStatus::Other(raw) => raw,
        }
    }

    pub fn from_stored(raw: &str) -> Self {
        raw.parse()
            .unwrap_or_else(|_| CertificateStatus::Other(raw.to_string()))
    }

    /// A certificate in one of these states means the learner passed.
    pub fn is_passing(&self) -> bool {
        matches!(
            self,
            CertificateStatus::Downloadable
                | CertificateStatus::Generating
                | CertificateStatus::Regenerating
        )
    }

    /// Audit-track results never surface through the API.
    pub fn is_eligible(&self) -> bool {
        !matches!(
            self,
            CertificateStatus::AuditPassing | CertificateStatus::AuditNotpassing
        )
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}

impl Serialize for CertificateStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CertificateStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CertificateStatus::from_stored(&raw))
    }
}

impl_text_type!(CertificateStatus, decode_with = CertificateStatus::from_stored);

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct GeneratedCertificate {
    pub id: CertificateId,
    pub user_id: UserId,
    pub course_id: CourseKey,
    pub mode: CourseMode,
    pub status: CertificateStatus,
    /// Final grade as written by the grader, e.g. `"0.85"`.
    pub grade: String,
    /// Externally hosted PDF. Empty when the certificate is rendered as HTML.
    pub download_url: String,
    pub verify_uuid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GeneratedCertificate {
    pub fn is_passing(&self) -> bool {
        self.status.is_passing()
    }
}
