//! Rate limiting configuration for API endpoints.
//!
//! Limits are enforced per socket peer address by a keyed `governor`
//! limiter. The login endpoint has its own, stricter bucket.
//!
//! # Configuration
//!
//! - `RATE_LIMIT_ENABLED`: set to `false` or `0` to disable limiting (default: enabled)
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: Requests per second for general endpoints (default: 20)
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: Burst size for general endpoints (default: 60)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: Requests per second for auth endpoints (default: 2)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: Burst size for auth endpoints (default: 5)
//! - `RATE_LIMIT_PRUNE_INTERVAL_SECS`: How often idle clients are forgotten (default: 60)
//!
//! # Rate Limiting Strategy
//!
//! The limiter uses the generic cell rate algorithm, which behaves like a
//! token bucket:
//!
//! - Tokens are added at the configured rate (per second)
//! - Each request consumes one token
//! - Burst size defines the maximum tokens that can accumulate
//! - Requests are rejected with `429` when no tokens are available

/// Rate limit configuration for the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Whether the rate limiting middleware is installed at all.
    pub enabled: bool,

    /// Requests per second for general endpoints.
    pub general_per_second: u32,

    /// Burst size for general endpoints.
    pub general_burst_size: u32,

    /// Requests per second for auth endpoints (stricter).
    ///
    /// Login has its own bucket so password guessing cannot borrow from
    /// the general allowance.
    pub auth_per_second: u32,

    /// Burst size for auth endpoints (stricter).
    pub auth_burst_size: u32,

    /// Seconds between sweeps that drop clients with full buckets.
    pub prune_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 20,
            general_burst_size: 60,
            auth_per_second: 2,
            auth_burst_size: 5,
            prune_interval_secs: 60,
        }
    }
}

impl RateLimitConfig {
    /// Creates a new `RateLimitConfig` from environment variables.
    ///
    /// Falls back to default values if environment variables are not set
    /// or cannot be parsed. Zero values are clamped to one.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enabled),
            general_per_second: read_positive("RATE_LIMIT_GENERAL_PER_SECOND")
                .unwrap_or(defaults.general_per_second),
            general_burst_size: read_positive("RATE_LIMIT_GENERAL_BURST_SIZE")
                .unwrap_or(defaults.general_burst_size),
            auth_per_second: read_positive("RATE_LIMIT_AUTH_PER_SECOND")
                .unwrap_or(defaults.auth_per_second),
            auth_burst_size: read_positive("RATE_LIMIT_AUTH_BURST_SIZE")
                .unwrap_or(defaults.auth_burst_size),
            prune_interval_secs: read_positive("RATE_LIMIT_PRUNE_INTERVAL_SECS")
                .map(u64::from)
                .unwrap_or(defaults.prune_interval_secs),
        }
    }

    /// A configuration with limiting switched off, used by tests and local tooling.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

fn read_positive(key: &str) -> Option<u32> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .map(|v| v.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.general_per_second, 20);
        assert_eq!(config.general_burst_size, 60);
        assert_eq!(config.auth_per_second, 2);
        assert_eq!(config.auth_burst_size, 5);
        assert_eq!(config.prune_interval_secs, 60);
    }

    #[test]
    fn test_disabled_keeps_limits() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.auth_burst_size, RateLimitConfig::default().auth_burst_size);
    }

    #[test]
    fn test_config_debug() {
        let config = RateLimitConfig::default();
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("RateLimitConfig"));
        assert!(debug_str.contains("general_per_second"));
    }
}
