//! # OpenLMS Config
//!
//! Configuration types for the OpenLMS API, each loaded from environment
//! variables with sensible defaults:
//!
//! - [`certificates`]: Certificate link rendering
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`jwt`]: JWT signing configuration
//! - [`proctoring`]: Proctoring backend settings used by courseware rules
//! - [`rate_limit`]: API rate limiting configuration
//! - [`session`]: Session cookie settings
//! - [`tracking`]: Event tracking and Segment webhook settings
//! - [`visibility`]: Account field visibility
//!
//! # Example
//!
//! ```ignore
//! use openlms_config::{JwtConfig, ProctoringConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let proctoring = ProctoringConfig::from_env();
//! ```

pub mod certificates;
pub mod cors;
pub mod jwt;
pub mod proctoring;
pub mod rate_limit;
pub mod session;
pub mod tracking;
pub mod visibility;

pub use certificates::CertificatesConfig;
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use proctoring::{ProctoringBackendConfig, ProctoringConfig};
pub use rate_limit::RateLimitConfig;
pub use session::SessionConfig;
pub use tracking::TrackingConfig;
pub use visibility::{
    ALL_USERS_VISIBILITY, AccountVisibilityConfig, CUSTOM_VISIBILITY, PRIVATE_VISIBILITY,
};
