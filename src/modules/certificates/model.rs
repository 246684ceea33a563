use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use openlms_models::{CertificateStatus, CourseMode, CourseOverview, GeneratedCertificate};

/// A certificate joined with its owner's username and the resolved
/// download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    pub username: String,
    pub certificate: GeneratedCertificate,
    pub download_url: Option<String>,
}

/// A single certificate of a user in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CertificateResponse {
    #[schema(example = "bob")]
    pub username: String,
    #[schema(example = "course-v1:edX+DemoX+Demo_Course")]
    pub course_id: String,
    #[schema(value_type = String, example = "verified")]
    pub certificate_type: CourseMode,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    #[schema(value_type = String, example = "downloadable")]
    pub status: CertificateStatus,
    pub is_passing: bool,
    /// Only set for downloadable certificates.
    #[schema(example = "http://www.example.com/cert.pdf")]
    pub download_url: Option<String>,
    #[schema(example = "0.98")]
    pub grade: String,
}

impl From<CertificateSummary> for CertificateResponse {
    fn from(summary: CertificateSummary) -> Self {
        let cert = summary.certificate;
        let is_passing = cert.is_passing();
        Self {
            username: summary.username,
            course_id: cert.course_id.to_string(),
            certificate_type: cert.mode,
            created_date: cert.created_at,
            modified_date: cert.updated_at,
            status: cert.status,
            is_passing,
            download_url: summary.download_url,
            grade: cert.grade,
        }
    }
}

/// An entry of a user's certificate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CertificateListItem {
    #[schema(example = "bob")]
    pub username: String,
    #[schema(example = "course-v1:edX+DemoX+Demo_Course")]
    pub course_id: String,
    #[schema(example = "Demonstration Course")]
    pub course_display_name: String,
    #[schema(example = "edX")]
    pub course_organization: String,
    #[schema(value_type = String, example = "verified")]
    pub certificate_type: CourseMode,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    #[schema(value_type = String, example = "downloadable")]
    pub status: CertificateStatus,
    pub is_passing: bool,
    pub download_url: Option<String>,
    pub grade: String,
}

impl CertificateListItem {
    pub fn new(summary: CertificateSummary, overview: &CourseOverview) -> Self {
        let CertificateResponse {
            username,
            course_id,
            certificate_type,
            created_date,
            modified_date,
            status,
            is_passing,
            download_url,
            grade,
        } = summary.into();

        Self {
            username,
            course_id,
            course_display_name: overview.display_name_with_default(),
            course_organization: overview.display_org_with_default(),
            certificate_type,
            created_date,
            modified_date,
            status,
            is_passing,
            download_url,
            grade,
        }
    }
}
