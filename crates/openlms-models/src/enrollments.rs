//! Course enrollments and enrollment modes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;

use crate::course_key::CourseKey;
use crate::ids::{EnrollmentId, UserId};
use crate::sql::impl_text_type;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown course mode: {0:?}")]
pub struct ModeParseError(pub String);

/// The track a learner is enrolled under. Certificates carry the same
/// vocabulary as their type.
///
/// Enrollments are written by other services, so stored rows may carry a
/// mode this crate does not know. Those decode to [`CourseMode::Other`] and
/// never qualify for anything mode-gated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CourseMode {
    Audit,
    Honor,
    Verified,
    Professional,
    NoIdProfessional,
    Masters,
    Credit,
    ExecutiveEducation,
    Other(String),
}

impl CourseMode {
    pub const ALL: [CourseMode; 8] = [
        CourseMode::Audit,
        CourseMode::Honor,
        CourseMode::Verified,
        CourseMode::Professional,
        CourseMode::NoIdProfessional,
        CourseMode::Masters,
        CourseMode::Credit,
        CourseMode::ExecutiveEducation,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            CourseMode::Audit => "audit",
            CourseMode::Honor => "honor",
            CourseMode::Verified => "verified",
            CourseMode::Professional => "professional",
            CourseMode::NoIdProfessional => "no-id-professional",
            CourseMode::Masters => "masters",
            CourseMode::Credit => "credit",
            CourseMode::ExecutiveEducation => "executive-education",
            CourseMode::Other(raw) => raw,
        }
    }

    /// Decodes a stored mode, keeping unrecognized values as `Other`.
    pub fn from_stored(raw: &str) -> Self {
        raw.parse()
            .unwrap_or_else(|_| CourseMode::Other(raw.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CourseMode::Other(_))
    }
}

impl fmt::Display for CourseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parsing for operator input: only the known modes are accepted.
impl FromStr for CourseMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ModeParseError(s.to_string()))
    }
}

impl Serialize for CourseMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CourseMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CourseMode::from_stored(&raw))
    }
}

impl_text_type!(CourseMode, decode_with = CourseMode::from_stored);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    #[schema(value_type = String, example = "course-v1:edX+DemoX+Demo_Course")]
    pub course_id: CourseKey,
    #[schema(value_type = String, example = "verified")]
    pub mode: CourseMode,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
