use std::fmt;
use std::sync::Arc;

use openlms_config::{
    AccountVisibilityConfig, CertificatesConfig, CorsConfig, JwtConfig, ProctoringConfig,
    RateLimitConfig, SessionConfig, TrackingConfig,
};

use crate::middleware::rate_limit::RateLimiters;
use crate::modules::courseware::rules::RuleRegistry;
use crate::modules::track::tracker::{LoggingTracker, Tracker};
use crate::store::CoursewareStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CoursewareStore>,
    pub tracker: Arc<dyn Tracker>,
    pub rules: Arc<RuleRegistry>,
    pub rate_limiters: RateLimiters,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub session_config: SessionConfig,
    pub certificates_config: CertificatesConfig,
    pub visibility_config: AccountVisibilityConfig,
    pub proctoring_config: ProctoringConfig,
    pub tracking_config: TrackingConfig,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("rate_limit_config", &self.rate_limit_config)
            .field("certificates_config", &self.certificates_config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// State with every configuration read from the environment.
    pub fn from_env(store: Arc<dyn CoursewareStore>) -> Self {
        let rate_limit_config = RateLimitConfig::from_env();
        Self {
            store,
            tracker: Arc::new(LoggingTracker),
            rules: Arc::new(RuleRegistry::default()),
            rate_limiters: RateLimiters::from_config(&rate_limit_config),
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            rate_limit_config,
            session_config: SessionConfig::from_env(),
            certificates_config: CertificatesConfig::from_env(),
            visibility_config: AccountVisibilityConfig::from_env(),
            proctoring_config: ProctoringConfig::from_env(),
            tracking_config: TrackingConfig::from_env(),
        }
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn Tracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_rate_limit_config(mut self, config: RateLimitConfig) -> Self {
        self.rate_limiters = RateLimiters::from_config(&config);
        self.rate_limit_config = config;
        self
    }
}
