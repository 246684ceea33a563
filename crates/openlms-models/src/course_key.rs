//! Course identifiers.
//!
//! Two textual forms are accepted:
//!
//! - `course-v1:ORG+COURSE+RUN`
//! - `ORG/COURSE/RUN` (deprecated, still found on old courses)
//!
//! A key remembers which form it was parsed from and renders back to it, so
//! `edX/DemoX/Demo_Course` and `course-v1:edX+DemoX+Demo_Course` are
//! distinct keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::sql::impl_text_type;

const COURSE_KEY_PREFIX: &str = "course-v1:";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseKeyError {
    #[error("invalid course key: {0:?}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseKey {
    org: String,
    course: String,
    run: String,
    deprecated: bool,
}

impl CourseKey {
    /// Builds a `course-v1:` key from its parts.
    pub fn new(org: &str, course: &str, run: &str) -> Result<Self, CourseKeyError> {
        Self::from_parts([org, course, run], false)
            .ok_or_else(|| CourseKeyError::Invalid(format!("{org}+{course}+{run}")))
    }

    fn from_parts(parts: [&str; 3], deprecated: bool) -> Option<Self> {
        if !parts.iter().all(|p| is_valid_part(p)) {
            return None;
        }
        let [org, course, run] = parts;
        Some(Self {
            org: org.to_string(),
            course: course.to_string(),
            run: run.to_string(),
            deprecated,
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn run(&self) -> &str {
        &self.run
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '~' | '.' | ':'))
}

fn split3(raw: &str, sep: char) -> Option<[&str; 3]> {
    let mut parts = raw.split(sep);
    let key = [parts.next()?, parts.next()?, parts.next()?];
    parts.next().is_none().then_some(key)
}

impl FromStr for CourseKey {
    type Err = CourseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.strip_prefix(COURSE_KEY_PREFIX) {
            Some(rest) => split3(rest, '+').and_then(|parts| Self::from_parts(parts, false)),
            None => split3(s, '/').and_then(|parts| Self::from_parts(parts, true)),
        };
        parsed.ok_or_else(|| CourseKeyError::Invalid(s.to_string()))
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.deprecated {
            write!(f, "{}/{}/{}", self.org, self.course, self.run)
        } else {
            write!(
                f,
                "{COURSE_KEY_PREFIX}{}+{}+{}",
                self.org, self.course, self.run
            )
        }
    }
}

impl Serialize for CourseKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CourseKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl_text_type!(CourseKey);

/// Extracts the course a page URL belongs to, if any.
///
/// Recognizes `.../courses/<course key>/...` with either key form.
pub fn course_key_from_url(url: &str) -> Option<CourseKey> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let (_, rest) = path.split_once("/courses/")?;

    if rest.starts_with(COURSE_KEY_PREFIX) {
        let raw = rest.split('/').next()?;
        raw.parse().ok()
    } else {
        let mut segments = rest.splitn(4, '/');
        let raw = [segments.next()?, segments.next()?, segments.next()?].join("/");
        raw.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_current_form() {
        let key: CourseKey = "course-v1:edX+DemoX+Demo_Course".parse().unwrap();
        assert_eq!(key.org(), "edX");
        assert_eq!(key.course(), "DemoX");
        assert_eq!(key.run(), "Demo_Course");
        assert!(!key.is_deprecated());
        assert_eq!(key.to_string(), "course-v1:edX+DemoX+Demo_Course");
    }

    #[test]
    fn test_parse_deprecated_form() {
        let key: CourseKey = "MITx/6.002x/2012_Fall".parse().unwrap();
        assert_eq!(key.org(), "MITx");
        assert!(key.is_deprecated());
        assert_eq!(key.to_string(), "MITx/6.002x/2012_Fall");
    }

    #[test]
    fn test_forms_are_distinct_keys() {
        let current: CourseKey = "course-v1:edX+DemoX+Demo".parse().unwrap();
        let deprecated: CourseKey = "edX/DemoX/Demo".parse().unwrap();
        assert_ne!(current, deprecated);
    }

    #[test]
    fn test_invalid_keys() {
        for raw in [
            "",
            "invalid",
            "course-v1:edX+DemoX",
            "course-v1:edX+DemoX+Demo+Extra",
            "course-v1:edX++Demo",
            "edX/DemoX",
            "edX/DemoX/Demo/extra",
            "edX/Demo X/Demo",
            "course-v1:edX+Demo$+Run",
        ] {
            assert!(raw.parse::<CourseKey>().is_err(), "{raw:?} should be invalid");
        }
    }

    #[test]
    fn test_new_validates_parts() {
        assert!(CourseKey::new("edX", "DemoX", "Demo").is_ok());
        assert!(CourseKey::new("edX", "", "Demo").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let key: CourseKey = "course-v1:edX+DemoX+Demo".parse().unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#""course-v1:edX+DemoX+Demo""#);
        assert_eq!(serde_json::from_str::<CourseKey>(&json).unwrap(), key);
        assert!(serde_json::from_str::<CourseKey>(r#""nope""#).is_err());
    }

    #[test]
    fn test_course_key_from_url() {
        let key = course_key_from_url(
            "https://lms.example.com/courses/course-v1:edX+DemoX+Demo/courseware?x=1",
        )
        .unwrap();
        assert_eq!(key.to_string(), "course-v1:edX+DemoX+Demo");

        let key = course_key_from_url("/courses/MITx/6.002x/2012_Fall/info").unwrap();
        assert_eq!(key.to_string(), "MITx/6.002x/2012_Fall");

        assert!(course_key_from_url("https://lms.example.com/dashboard").is_none());
        assert!(course_key_from_url("/courses/not-a-key").is_none());
    }
}
