use std::env;

/// Session cookie settings.
///
/// - `SESSION_COOKIE_NAME`: cookie carrying the session key (default `sessionid`)
/// - `SESSION_COOKIE_AGE`: session lifetime in seconds (default two weeks)
/// - `SESSION_COOKIE_SECURE`: add the `Secure` attribute (default `false`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_age: i64,
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sessionid".to_string(),
            cookie_age: 1_209_600,
            cookie_secure: false,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cookie_name: env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            cookie_age: env::var("SESSION_COOKIE_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cookie_age),
            cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.cookie_secure),
        }
    }

    /// `Set-Cookie` value for a freshly created session.
    pub fn set_cookie_header(&self, session_key: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name, session_key, self.cookie_age
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_cookie_header() {
        let config = SessionConfig::default();
        let header = config.set_cookie_header("abc");
        assert!(header.starts_with("sessionid=abc;"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Max-Age=1209600"));
        assert!(!header.contains("Secure"));
    }

    #[test]
    fn test_secure_cookie() {
        let config = SessionConfig {
            cookie_secure: true,
            ..SessionConfig::default()
        };
        assert!(config.set_cookie_header("abc").ends_with("; Secure"));
    }
}
