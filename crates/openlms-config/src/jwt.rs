use std::env;

/// JWT signing configuration.
///
/// - `JWT_SECRET`: HMAC secret
/// - `JWT_ACCESS_EXPIRY`: access token lifetime in seconds (default 1 hour)
/// - `JWT_ISSUER`: `iss` claim written into and required from tokens
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
    pub issuer: String,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            access_token_expiry: env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600), // 1 hour
            issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "http://localhost:8000/oauth2".to_string()),
        }
    }
}
