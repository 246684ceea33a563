//! # OpenLMS Auth
//!
//! Authentication types and token utilities for the OpenLMS API.
//!
//! - [`claims`]: JWT claim structure, including the OAuth grant
//! - [`jwt`]: Token creation and verification
//! - [`tokens`]: Opaque OAuth2 token and session key generation and hashing
//!
//! # Example
//!
//! ```ignore
//! use openlms_auth::{AccessGrant, Claims, create_access_token, verify_token};
//! use openlms_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "bob", "bob@example.com", false, AccessGrant::default(), &config)?;
//! let claims: Claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;
pub mod tokens;

pub use claims::Claims;
pub use jwt::{AccessGrant, create_access_token, looks_like_jwt, verify_token};
pub use tokens::{generate_token, hash_token};
