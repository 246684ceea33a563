//! JWT claim structures for access tokens.
//!
//! Tokens follow the OAuth provider's JWT layout: identity claims plus
//! `scopes`, `filters` and `is_restricted`, which together describe what a
//! (possibly restricted) client application may do for the user.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JWT claims for access tokens.
///
/// # Fields
///
/// - `sub`: User ID (subject)
/// - `preferred_username`: Username used to resolve the user
/// - `email`: User's email address
/// - `administrator`: Staff flag at issue time
/// - `scopes`: OAuth scopes granted to the client
/// - `filters`: `type:value` pairs narrowing the grant, e.g. `user:me`, `content_org:edX`
/// - `is_restricted`: Whether the token was issued to a restricted application
/// - `iss`: Issuer
/// - `exp` / `iat`: Expiry and issued-at timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// Username of the user the token acts for
    pub preferred_username: String,
    /// User's email address
    #[serde(default)]
    pub email: String,
    /// Staff flag of the user when the token was issued
    #[serde(default)]
    pub administrator: bool,
    /// OAuth scopes granted to the client application
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Grant filters in `type:value` form
    #[serde(default)]
    pub filters: Vec<String>,
    /// Issued to a restricted application
    #[serde(default)]
    pub is_restricted: bool,
    /// Token issuer
    pub iss: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Values of every filter of the given type, e.g. `content_org`.
    pub fn filter_values<'a>(&'a self, filter_type: &'a str) -> impl Iterator<Item = &'a str> {
        self.filters.iter().filter_map(move |filter| {
            filter
                .split_once(':')
                .filter(|(kind, _)| *kind == filter_type)
                .map(|(_, value)| value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_filters(filters: &[&str]) -> Claims {
        Claims {
            sub: "user-id-123".to_string(),
            preferred_username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            administrator: false,
            scopes: vec!["certificates:read".to_string()],
            filters: filters.iter().map(|f| f.to_string()).collect(),
            is_restricted: true,
            iss: "test-issuer".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        }
    }

    #[test]
    fn test_claims_serialize() {
        let claims = claims_with_filters(&["user:me"]);
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""preferred_username":"bob""#));
        assert!(serialized.contains(r#""filters":["user:me"]"#));
        assert!(serialized.contains(r#""is_restricted":true"#));
    }

    #[test]
    fn test_claims_deserialize_defaults() {
        let json = r#"{"sub":"user-id-456","preferred_username":"alice","iss":"x","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.preferred_username, "alice");
        assert!(claims.scopes.is_empty());
        assert!(claims.filters.is_empty());
        assert!(!claims.is_restricted);
        assert!(!claims.administrator);
    }

    #[test]
    fn test_has_scope() {
        let claims = claims_with_filters(&[]);
        assert!(claims.has_scope("certificates:read"));
        assert!(!claims.has_scope("email"));
    }

    #[test]
    fn test_filter_values() {
        let claims = claims_with_filters(&["content_org:edX", "user:me", "content_org:MITx"]);
        let orgs: Vec<&str> = claims.filter_values("content_org").collect();
        assert_eq!(orgs, vec!["edX", "MITx"]);
        let users: Vec<&str> = claims.filter_values("user").collect();
        assert_eq!(users, vec!["me"]);
        assert_eq!(claims.filter_values("missing").count(), 0);
    }
}
