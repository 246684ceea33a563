//! Composable request permissions.
//!
//! Endpoints declare their access rule as a [`Condition`] built from
//! [`Check`]s with `&` and `|`:
//!
//! ```ignore
//! let rule = Check::IsAuthenticated
//!     & (Check::NotJwtRestrictedApplication
//!         | (Check::JwtRestrictedApplication
//!             & Check::JwtHasScope
//!             & Check::JwtHasUserFilterForRequestedUser));
//! ```
//!
//! and enforce it with [`require`] against a [`PermissionContext`] that
//! carries the caller plus the URL parameters the checks look at.

use std::ops::{BitAnd, BitOr};

use openlms_core::{AppError, permissions};
use openlms_models::CourseKey;

use crate::metrics::track_permission_check;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    IsAuthenticated,
    IsStaff,
    /// The URL `username` matches the caller, ignoring case.
    IsUserInUrl,
    JwtRestrictedApplication,
    NotJwtRestrictedApplication,
    /// The JWT carries every scope the endpoint requires.
    JwtHasScope,
    /// The JWT has a `content_org:<org>` filter for the org of the URL course.
    JwtHasContentOrgFilterForRequestedCourse,
    /// A `user:me` filter, when present, limits the JWT to its own user.
    JwtHasUserFilterForRequestedUser,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Check(Check),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

pub struct PermissionContext<'a> {
    pub user: Option<&'a AuthUser>,
    pub required_scopes: &'a [&'a str],
    pub username: Option<&'a str>,
    pub course_id: Option<&'a str>,
}

impl<'a> PermissionContext<'a> {
    pub fn new(user: Option<&'a AuthUser>) -> Self {
        Self {
            user,
            required_scopes: &[],
            username: None,
            course_id: None,
        }
    }

    pub fn scopes(mut self, scopes: &'a [&'a str]) -> Self {
        self.required_scopes = scopes;
        self
    }

    pub fn username(mut self, username: &'a str) -> Self {
        self.username = Some(username);
        self
    }

    pub fn course_id(mut self, course_id: &'a str) -> Self {
        self.course_id = Some(course_id);
        self
    }
}

impl Check {
    pub fn evaluate(&self, ctx: &PermissionContext<'_>) -> bool {
        let Some(user) = ctx.user else {
            return false;
        };
        let claims = user.claims();

        match self {
            Check::IsAuthenticated => true,
            Check::IsStaff => user.is_staff(),
            Check::IsUserInUrl => ctx
                .username
                .is_some_and(|name| name.eq_ignore_ascii_case(user.username())),
            Check::JwtRestrictedApplication => user.is_jwt_restricted(),
            Check::NotJwtRestrictedApplication => !user.is_jwt_restricted(),
            Check::JwtHasScope => claims.is_some_and(|c| {
                ctx.required_scopes.iter().all(|scope| c.has_scope(scope))
            }),
            Check::JwtHasContentOrgFilterForRequestedCourse => {
                let Some(course_key) = ctx.course_id.and_then(|id| id.parse::<CourseKey>().ok())
                else {
                    return false;
                };
                claims.is_some_and(|c| {
                    c.filter_values(permissions::CONTENT_ORG_FILTER)
                        .any(|org| org == course_key.org())
                })
            }
            Check::JwtHasUserFilterForRequestedUser => {
                let Some(claims) = claims else {
                    return false;
                };
                let limits_to_self = claims
                    .filter_values(permissions::USER_FILTER)
                    .any(|value| value == permissions::USER_FILTER_ME);
                !limits_to_self || ctx.username == Some(user.username())
            }
        }
    }
}

impl Condition {
    pub fn evaluate(&self, ctx: &PermissionContext<'_>) -> bool {
        match self {
            Condition::Check(check) => check.evaluate(ctx),
            Condition::All(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.evaluate(ctx)),
        }
    }
}

impl From<Check> for Condition {
    fn from(check: Check) -> Self {
        Condition::Check(check)
    }
}

impl<R: Into<Condition>> BitAnd<R> for Condition {
    type Output = Condition;

    fn bitand(self, rhs: R) -> Condition {
        match self {
            Condition::All(mut conditions) => {
                conditions.push(rhs.into());
                Condition::All(conditions)
            }
            other => Condition::All(vec![other, rhs.into()]),
        }
    }
}

impl<R: Into<Condition>> BitOr<R> for Condition {
    type Output = Condition;

    fn bitor(self, rhs: R) -> Condition {
        match self {
            Condition::Any(mut conditions) => {
                conditions.push(rhs.into());
                Condition::Any(conditions)
            }
            other => Condition::Any(vec![other, rhs.into()]),
        }
    }
}

impl<R: Into<Condition>> BitAnd<R> for Check {
    type Output = Condition;

    fn bitand(self, rhs: R) -> Condition {
        Condition::from(self) & rhs
    }
}

impl<R: Into<Condition>> BitOr<R> for Check {
    type Output = Condition;

    fn bitor(self, rhs: R) -> Condition {
        Condition::from(self) | rhs
    }
}

/// Enforces `condition`: 401 for anonymous callers, 403 otherwise.
pub fn require(condition: &Condition, ctx: &PermissionContext<'_>) -> Result<(), AppError> {
    let allowed = condition.evaluate(ctx);
    track_permission_check(allowed);

    match (allowed, ctx.user) {
        (true, _) => Ok(()),
        (false, None) => Err(AppError::unauthorized(
            "Authentication credentials were not provided.",
        )),
        (false, Some(user)) => {
            tracing::debug!(user = %user.username(), "permission denied");
            Err(AppError::forbidden(
                "You do not have permission to perform this action.",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use openlms_auth::Claims;
    use openlms_models::{User, UserId};

    use super::*;
    use crate::middleware::auth::AuthMethod;

    fn user(username: &str, is_staff: bool, method: AuthMethod) -> AuthUser {
        AuthUser {
            user: User {
                id: UserId::new(),
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: String::new(),
                is_staff,
                is_superuser: false,
                is_active: true,
                date_joined: Utc::now(),
            },
            method,
        }
    }

    fn jwt(restricted: bool, scopes: &[&str], filters: &[&str]) -> AuthMethod {
        AuthMethod::Jwt(Claims {
            sub: UserId::new().to_string(),
            preferred_username: "bob".to_string(),
            email: String::new(),
            administrator: false,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            filters: filters.iter().map(|s| s.to_string()).collect(),
            is_restricted: restricted,
            iss: "test".to_string(),
            exp: 0,
            iat: 0,
        })
    }

    #[test]
    fn test_operators_flatten() {
        let condition = Check::IsAuthenticated & Check::IsStaff & Check::IsUserInUrl;
        assert_eq!(
            condition,
            Condition::All(vec![
                Condition::Check(Check::IsAuthenticated),
                Condition::Check(Check::IsStaff),
                Condition::Check(Check::IsUserInUrl),
            ])
        );
    }

    #[test]
    fn test_anonymous_fails_every_check() {
        let ctx = PermissionContext::new(None).username("bob");
        assert!(!Check::IsAuthenticated.evaluate(&ctx));
        assert!(!Check::NotJwtRestrictedApplication.evaluate(&ctx));
        assert!(require(&Check::IsAuthenticated.into(), &ctx).is_err());
    }

    #[test]
    fn test_is_user_in_url_ignores_case() {
        let bob = user("Bob", false, AuthMethod::Session);
        let ctx = PermissionContext::new(Some(&bob)).username("bob");
        assert!(Check::IsUserInUrl.evaluate(&ctx));
        let ctx = PermissionContext::new(Some(&bob)).username("alice");
        assert!(!Check::IsUserInUrl.evaluate(&ctx));
    }

    #[test]
    fn test_jwt_has_scope() {
        let bob = user("bob", false, jwt(true, &["certificates:read"], &[]));
        let scopes = [permissions::CERTIFICATES_READ];
        let ctx = PermissionContext::new(Some(&bob)).scopes(&scopes);
        assert!(Check::JwtHasScope.evaluate(&ctx));

        let bob = user("bob", false, jwt(true, &["email"], &[]));
        let ctx = PermissionContext::new(Some(&bob)).scopes(&scopes);
        assert!(!Check::JwtHasScope.evaluate(&ctx));

        let bob = user("bob", false, AuthMethod::Session);
        let ctx = PermissionContext::new(Some(&bob)).scopes(&scopes);
        assert!(!Check::JwtHasScope.evaluate(&ctx));
    }

    #[test]
    fn test_content_org_filter() {
        let bob = user("bob", false, jwt(true, &[], &["content_org:edX"]));
        let ctx = PermissionContext::new(Some(&bob)).course_id("course-v1:edX+DemoX+Demo");
        assert!(Check::JwtHasContentOrgFilterForRequestedCourse.evaluate(&ctx));

        let ctx = PermissionContext::new(Some(&bob)).course_id("course-v1:MITx+6.002x+2024");
        assert!(!Check::JwtHasContentOrgFilterForRequestedCourse.evaluate(&ctx));

        let ctx = PermissionContext::new(Some(&bob)).course_id("garbage");
        assert!(!Check::JwtHasContentOrgFilterForRequestedCourse.evaluate(&ctx));
    }

    #[test]
    fn test_user_filter() {
        let bob = user("bob", false, jwt(true, &[], &["user:me"]));
        assert!(
            Check::JwtHasUserFilterForRequestedUser
                .evaluate(&PermissionContext::new(Some(&bob)).username("bob"))
        );
        assert!(
            !Check::JwtHasUserFilterForRequestedUser
                .evaluate(&PermissionContext::new(Some(&bob)).username("alice"))
        );

        let unfiltered = user("bob", false, jwt(true, &[], &[]));
        assert!(
            Check::JwtHasUserFilterForRequestedUser
                .evaluate(&PermissionContext::new(Some(&unfiltered)).username("alice"))
        );
    }

    #[test]
    fn test_require_distinguishes_401_and_403() {
        let condition = Check::IsAuthenticated & Check::IsStaff;
        let bob = user("bob", false, AuthMethod::Session);

        let err = require(&condition, &PermissionContext::new(None)).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);

        let err = require(&condition, &PermissionContext::new(Some(&bob))).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
    }
}
