//! Course overviews: cached course metadata joined against certificates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;

use crate::course_key::CourseKey;
use crate::sql::impl_text_type;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown certificates display behavior: {0:?}")]
pub struct DisplayBehaviorParseError(pub String);

/// When a course publishes certificates to learners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CertificatesDisplayBehavior {
    EarlyWithInfo,
    EarlyNoInfo,
    #[default]
    End,
}

impl CertificatesDisplayBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificatesDisplayBehavior::EarlyWithInfo => "early_with_info",
            CertificatesDisplayBehavior::EarlyNoInfo => "early_no_info",
            CertificatesDisplayBehavior::End => "end",
        }
    }

    fn is_early(&self) -> bool {
        matches!(
            self,
            CertificatesDisplayBehavior::EarlyWithInfo | CertificatesDisplayBehavior::EarlyNoInfo
        )
    }
}

impl fmt::Display for CertificatesDisplayBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificatesDisplayBehavior {
    type Err = DisplayBehaviorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "early_with_info" => Ok(Self::EarlyWithInfo),
            "early_no_info" => Ok(Self::EarlyNoInfo),
            "end" => Ok(Self::End),
            other => Err(DisplayBehaviorParseError(other.to_string())),
        }
    }
}

impl_text_type!(CertificatesDisplayBehavior);

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CourseOverview {
    pub id: CourseKey,
    pub display_name: Option<String>,
    pub display_org: Option<String>,
    pub self_paced: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub certificate_available_date: Option<DateTime<Utc>>,
    pub certificates_display_behavior: CertificatesDisplayBehavior,
    pub certificates_show_before_end: bool,
    pub cert_html_view_enabled: bool,
}

impl CourseOverview {
    /// An overview with nothing but the key set: instructor paced, no
    /// dates, certificates shown at course end.
    pub fn new(id: CourseKey) -> Self {
        Self {
            id,
            display_name: None,
            display_org: None,
            self_paced: false,
            start_date: None,
            end_date: None,
            certificate_available_date: None,
            certificates_display_behavior: CertificatesDisplayBehavior::End,
            certificates_show_before_end: false,
            cert_html_view_enabled: false,
        }
    }

    /// The display name, or the run with underscores turned into spaces.
    pub fn display_name_with_default(&self) -> String {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.id.run().replace('_', " "),
        }
    }

    pub fn display_org_with_default(&self) -> String {
        match self.display_org.as_deref() {
            Some(org) if !org.is_empty() => org.to_string(),
            _ => self.id.org().to_string(),
        }
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_date.is_some_and(|end| end < now)
    }

    /// Whether learners may see their certificates for this course at `now`.
    pub fn certificates_viewable(&self, now: DateTime<Utc>) -> bool {
        if self.self_paced
            || self.certificates_display_behavior.is_early()
            || self.certificates_show_before_end
        {
            return true;
        }

        match self.certificate_available_date {
            Some(available) => available <= now,
            None => self.has_ended(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn overview() -> CourseOverview {
        CourseOverview::new("course-v1:edX+DemoX+Demo_Course".parse().unwrap())
    }

    #[test]
    fn test_display_defaults() {
        let course = overview();
        assert_eq!(course.display_name_with_default(), "Demo Course");
        assert_eq!(course.display_org_with_default(), "edX");

        let course = CourseOverview {
            display_name: Some("Demonstration".to_string()),
            display_org: Some("edX Inc.".to_string()),
            ..overview()
        };
        assert_eq!(course.display_name_with_default(), "Demonstration");
        assert_eq!(course.display_org_with_default(), "edX Inc.");
    }

    #[test]
    fn test_running_course_hides_certificates() {
        let now = Utc::now();
        let course = CourseOverview {
            end_date: Some(now + Duration::days(10)),
            ..overview()
        };
        assert!(!course.certificates_viewable(now));
    }

    #[test]
    fn test_ended_course_shows_certificates() {
        let now = Utc::now();
        let course = CourseOverview {
            end_date: Some(now - Duration::days(1)),
            ..overview()
        };
        assert!(course.certificates_viewable(now));
    }

    #[test]
    fn test_available_date_overrides_end() {
        let now = Utc::now();
        let course = CourseOverview {
            end_date: Some(now - Duration::days(1)),
            certificate_available_date: Some(now + Duration::days(5)),
            ..overview()
        };
        assert!(!course.certificates_viewable(now));

        let course = CourseOverview {
            certificate_available_date: Some(now - Duration::days(5)),
            ..course
        };
        assert!(course.certificates_viewable(now));
    }

    #[test]
    fn test_early_display_and_self_paced() {
        let now = Utc::now();
        let future_end = Some(now + Duration::days(30));

        for course in [
            CourseOverview {
                self_paced: true,
                end_date: future_end,
                ..overview()
            },
            CourseOverview {
                certificates_display_behavior: CertificatesDisplayBehavior::EarlyNoInfo,
                end_date: future_end,
                ..overview()
            },
            CourseOverview {
                certificates_show_before_end: true,
                end_date: future_end,
                ..overview()
            },
        ] {
            assert!(course.certificates_viewable(now));
        }
    }

    #[test]
    fn test_no_dates_hides_certificates() {
        assert!(!overview().certificates_viewable(Utc::now()));
    }
}
