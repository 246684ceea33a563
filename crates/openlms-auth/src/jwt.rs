//! JWT (JSON Web Token) utilities for authentication.
//!
//! Access tokens are HS256-signed and carry the user's identity together
//! with the OAuth grant (`scopes`, `filters`, `is_restricted`). Verification
//! checks the signature, expiry and issuer.
//!
//! # Example
//!
//! ```ignore
//! use openlms_auth::{AccessGrant, create_access_token, verify_token};
//! use openlms_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//!
//! let token = create_access_token(
//!     user_id,
//!     "bob",
//!     "bob@example.com",
//!     false,
//!     AccessGrant::restricted(vec!["certificates:read".into()], vec!["user:me".into()]),
//!     &config,
//! )?;
//!
//! let claims = verify_token(&token, &config)?;
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use openlms_config::JwtConfig;
use openlms_core::AppError;

use crate::claims::Claims;

/// What a token lets its bearer do beyond identifying the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessGrant {
    pub scopes: Vec<String>,
    pub filters: Vec<String>,
    pub is_restricted: bool,
}

impl AccessGrant {
    /// Grant for a restricted application: it may only act within the given
    /// scopes and filters.
    pub fn restricted(scopes: Vec<String>, filters: Vec<String>) -> Self {
        Self {
            scopes,
            filters,
            is_restricted: true,
        }
    }
}

/// Creates an access token for the given user and grant.
///
/// # Errors
///
/// Returns an internal error if token encoding fails.
pub fn create_access_token(
    user_id: Uuid,
    username: &str,
    email: &str,
    administrator: bool,
    grant: AccessGrant,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        preferred_username: username.to_string(),
        email: email.to_string(),
        administrator,
        scopes: grant.scopes,
        filters: grant.filters,
        is_restricted: grant.is_restricted,
        iss: jwt_config.issuer.clone(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies an access token and returns the embedded claims.
///
/// # Errors
///
/// Returns an unauthorized error if the signature is invalid, the token has
/// expired, the issuer does not match or the token is malformed.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[jwt_config.issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}

/// Cheap structural check: three non-empty dot separated segments.
///
/// Used to tell JWTs apart from opaque OAuth2 tokens sent with the same
/// `Bearer` scheme.
pub fn looks_like_jwt(token: &str) -> bool {
    let mut segments = token.split('.');
    let well_formed = (&mut segments).take(3).filter(|s| !s.is_empty()).count() == 3;
    well_formed && segments.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            issuer: "test-issuer".to_string(),
        }
    }

    #[test]
    fn test_create_access_token_success() {
        let config = get_test_jwt_config();
        let token = create_access_token(
            Uuid::new_v4(),
            "bob",
            "bob@example.com",
            false,
            AccessGrant::default(),
            &config,
        )
        .unwrap();
        assert!(!token.is_empty());
        assert!(looks_like_jwt(&token));
    }

    #[test]
    fn test_verify_token_success() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();

        let token = create_access_token(
            user_id,
            "bob",
            "bob@example.com",
            true,
            AccessGrant::restricted(
                vec!["certificates:read".to_string()],
                vec!["user:me".to_string()],
            ),
            &config,
        )
        .unwrap();

        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.preferred_username, "bob");
        assert!(claims.administrator);
        assert!(claims.is_restricted);
        assert_eq!(claims.scopes, vec!["certificates:read".to_string()]);
        assert_eq!(claims.filters, vec!["user:me".to_string()]);
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn test_verify_token_invalid() {
        let config = get_test_jwt_config();
        assert!(verify_token("invalid-token", &config).is_err());
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let config = get_test_jwt_config();
        let token = create_access_token(
            Uuid::new_v4(),
            "bob",
            "bob@example.com",
            false,
            AccessGrant::default(),
            &config,
        )
        .unwrap();

        let wrong_config = JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..get_test_jwt_config()
        };

        assert!(verify_token(&token, &wrong_config).is_err());
    }

    #[test]
    fn test_verify_token_wrong_issuer() {
        let config = get_test_jwt_config();
        let token = create_access_token(
            Uuid::new_v4(),
            "bob",
            "bob@example.com",
            false,
            AccessGrant::default(),
            &config,
        )
        .unwrap();

        let other_issuer = JwtConfig {
            issuer: "someone-else".to_string(),
            ..get_test_jwt_config()
        };

        assert!(verify_token(&token, &other_issuer).is_err());
    }

    #[test]
    fn test_verify_token_expired() {
        let config = get_test_jwt_config();
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            preferred_username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            administrator: false,
            scopes: vec![],
            filters: vec![],
            is_restricted: false,
            iss: config.issuer.clone(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_looks_like_jwt() {
        assert!(looks_like_jwt("aaa.bbb.ccc"));
        assert!(!looks_like_jwt("opaque-token"));
        assert!(!looks_like_jwt("aaa..ccc"));
        assert!(!looks_like_jwt("a.b.c.d"));
    }
}
