//! Middleware and extractors for cross-cutting request concerns.
//!
//! - [`auth`]: Authentication chain (JWT, OAuth2 bearer token, session cookie)
//! - [`permissions`]: Composable permission checks
//! - [`rate_limit`]: Per-client rate limiting
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//! use crate::middleware::permissions::{Check, PermissionContext, require};
//!
//! async fn handler(auth_user: AuthUser, Path(username): Path<String>) -> Result<_, AppError> {
//!     let rule = Check::IsAuthenticated & (Check::IsStaff | Check::IsUserInUrl);
//!     require(&rule, &PermissionContext::new(Some(&auth_user)).username(&username))?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod permissions;
pub mod rate_limit;
