//! # OpenLMS Models
//!
//! Domain models and DTOs for the OpenLMS API.
//!
//! # Modules
//!
//! - [`auth`]: Login DTOs, stored OAuth2 tokens and sessions
//! - [`certificates`]: Generated certificates and their statuses
//! - [`course_key`]: Course identifier parsing
//! - [`courses`]: Course overviews and certificate display rules
//! - [`enrollments`]: Enrollments and enrollment modes
//! - [`ids`]: Strongly-typed entity IDs
//! - [`users`]: Users, profiles and preferences
//!
//! # Example
//!
//! ```ignore
//! use openlms_models::{CourseKey, CertificateStatus};
//!
//! let key: CourseKey = "course-v1:edX+DemoX+Demo_Course".parse()?;
//! assert!(CertificateStatus::Downloadable.is_passing());
//! ```

mod sql;

pub mod auth;
pub mod certificates;
pub mod course_key;
pub mod courses;
pub mod enrollments;
pub mod ids;
pub mod users;

pub use auth::{AccessTokenRecord, LoginRequest, LoginResponse, LoginUser, SessionRecord};
pub use certificates::{CertificateStatus, GeneratedCertificate};
pub use course_key::{CourseKey, CourseKeyError, course_key_from_url};
pub use courses::{CertificatesDisplayBehavior, CourseOverview};
pub use enrollments::{CourseMode, Enrollment, ModeParseError};
pub use ids::{CertificateId, EnrollmentId, UserId};
pub use users::{User, UserPreference, UserProfile};
