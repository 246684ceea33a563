use std::env;

/// Certificate rendering settings.
///
/// - `LMS_ROOT_URL`: base URL used when building HTML certificate links
/// - `CERTIFICATES_HTML_VIEW_ENABLED`: platform-wide switch for web certificates
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificatesConfig {
    pub lms_root_url: String,
    pub html_view_enabled: bool,
}

impl Default for CertificatesConfig {
    fn default() -> Self {
        Self {
            lms_root_url: "http://localhost:8000".to_string(),
            html_view_enabled: true,
        }
    }
}

impl CertificatesConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lms_root_url: env::var("LMS_ROOT_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.lms_root_url),
            html_view_enabled: env::var("CERTIFICATES_HTML_VIEW_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.html_view_enabled),
        }
    }

    /// Absolute URL of the web certificate identified by `verify_uuid`.
    pub fn html_certificate_url(&self, verify_uuid: &str) -> String {
        format!("{}/certificates/{}", self.lms_root_url, verify_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_certificate_url() {
        let config = CertificatesConfig {
            lms_root_url: "https://courses.example.com".to_string(),
            html_view_enabled: true,
        };
        assert_eq!(
            config.html_certificate_url("abc123"),
            "https://courses.example.com/certificates/abc123"
        );
    }
}
