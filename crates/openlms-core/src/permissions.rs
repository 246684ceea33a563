//! Scope and permission name constants for the OpenLMS API.
//!
//! OAuth scopes gate what a restricted application's JWT may do; permission
//! names are the keys of the courseware rule registry.
//!
//! # Example
//!
//! ```ignore
//! use openlms_core::permissions;
//!
//! if claims.scopes.iter().any(|s| s == permissions::CERTIFICATES_READ) {
//!     // Restricted application may read certificates
//! }
//! ```

// =============================================================================
// OAuth scopes
// =============================================================================

/// Scope required to read certificate data on behalf of a user
pub const CERTIFICATES_READ: &str = "certificates:read";
/// Scope required to read a user's email address
pub const EMAIL: &str = "email";
/// Scope required to read a user's profile
pub const PROFILE: &str = "profile";

// =============================================================================
// JWT filters
// =============================================================================

/// Filter prefix restricting a JWT to a single user (`user:me` or `user:<name>`)
pub const USER_FILTER: &str = "user";
/// Filter prefix restricting a JWT to courses of one organization
pub const CONTENT_ORG_FILTER: &str = "content_org";
/// Value of a user filter that means "the token's own user"
pub const USER_FILTER_ME: &str = "me";

// =============================================================================
// Courseware permissions
// =============================================================================

/// Permission to take a proctored exam in a course
pub const CAN_TAKE_PROCTORED_EXAM: &str = "edx_proctoring.can_take_proctored_exam";
