#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use uuid::Uuid;

use openlms::middleware::rate_limit::RateLimiters;
use openlms::modules::courseware::rules::RuleRegistry;
use openlms::modules::track::tracker::MemoryTracker;
use openlms::router::init_router;
use openlms::state::AppState;
use openlms::store::{CoursewareStore, MemoryStore};
use openlms_auth::{AccessGrant, create_access_token};
use openlms_config::{
    AccountVisibilityConfig, CertificatesConfig, CorsConfig, JwtConfig, ProctoringConfig,
    RateLimitConfig, SessionConfig, TrackingConfig,
};
use openlms_models::{
    CertificateId, CertificateStatus, CourseKey, CourseMode, CourseOverview, Enrollment,
    EnrollmentId, GeneratedCertificate, User, UserId, UserProfile,
};

pub const DEMO_COURSE: &str = "course-v1:edX+DemoX+Demo_Course";
pub const WEBHOOK_SECRET: &str = "segment-secret";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
        issuer: "test-issuer".to_string(),
    }
}

/// Everything a test needs to drive the router and inspect side effects.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub tracker: Arc<MemoryTracker>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_proctoring(ProctoringConfig::default())
    }

    pub fn with_proctoring(proctoring_config: ProctoringConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let tracker = Arc::new(MemoryTracker::new());
        let rate_limit_config = RateLimitConfig::disabled();

        let state = AppState {
            store: store.clone(),
            tracker: tracker.clone(),
            rules: Arc::new(RuleRegistry::default()),
            rate_limiters: RateLimiters::from_config(&rate_limit_config),
            jwt_config: jwt_config(),
            cors_config: CorsConfig {
                allowed_origins: vec!["http://localhost:18000".to_string()],
            },
            rate_limit_config,
            session_config: SessionConfig::default(),
            certificates_config: CertificatesConfig {
                lms_root_url: "https://courses.example.com".to_string(),
                html_view_enabled: true,
            },
            visibility_config: AccountVisibilityConfig::default(),
            proctoring_config,
            tracking_config: TrackingConfig {
                segmentio_webhook_secret: Some(WEBHOOK_SECRET.to_string()),
                ..TrackingConfig::default()
            },
        };

        Self {
            store,
            tracker,
            state,
        }
    }

    pub fn router(&self) -> axum::Router {
        init_router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.router().oneshot(request).await.unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("JWT {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn course_key(id: &str) -> CourseKey {
    id.parse().unwrap()
}

/// Inserts an active user with a public profile. The password hash is a
/// placeholder; use [`create_user_with_password`] for login tests.
pub async fn create_user(store: &dyn CoursewareStore, username: &str, is_staff: bool) -> User {
    let user = User {
        id: UserId::new(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "!".to_string(),
        is_staff,
        is_superuser: false,
        is_active: true,
        date_joined: Utc::now() - Duration::days(30),
    };
    store.insert_user(&user).await.unwrap();
    store
        .upsert_profile(&UserProfile {
            user_id: user.id,
            name: format!("{username} Tester"),
            year_of_birth: Some(1990),
        })
        .await
        .unwrap();
    user
}

pub async fn create_user_with_password(
    store: &dyn CoursewareStore,
    username: &str,
    password: &str,
    is_active: bool,
) -> User {
    let user = User {
        id: UserId::new(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: openlms_core::hash_password(password).unwrap(),
        is_staff: false,
        is_superuser: false,
        is_active,
        date_joined: Utc::now(),
    };
    store.insert_user(&user).await.unwrap();
    user
}

/// An ended, instructor-paced course so its certificates are viewable.
pub async fn create_course(store: &dyn CoursewareStore, course_id: &str, name: &str) -> CourseOverview {
    let mut overview = CourseOverview::new(course_key(course_id));
    overview.display_name = Some(name.to_string());
    overview.end_date = Some(Utc::now() - Duration::days(1));
    store.upsert_course_overview(&overview).await.unwrap();
    overview
}

pub async fn create_certificate(
    store: &dyn CoursewareStore,
    user: &User,
    course_id: &str,
    status: CertificateStatus,
    created_at: DateTime<Utc>,
) -> GeneratedCertificate {
    let certificate = GeneratedCertificate {
        id: CertificateId::new(),
        user_id: user.id,
        course_id: course_key(course_id),
        mode: CourseMode::Verified,
        status,
        grade: "0.88".to_string(),
        download_url: String::new(),
        verify_uuid: Uuid::new_v4().simple().to_string(),
        created_at,
        updated_at: created_at,
    };
    store.upsert_certificate(&certificate).await.unwrap();
    certificate
}

pub async fn enroll(store: &dyn CoursewareStore, user: &User, course_id: &str, mode: CourseMode) {
    store
        .upsert_enrollment(&Enrollment {
            id: EnrollmentId::new(),
            user_id: user.id,
            course_id: course_key(course_id),
            mode,
            is_active: true,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
}

pub fn token_for(user: &User, grant: AccessGrant) -> String {
    create_access_token(
        user.id.into_inner(),
        &user.username,
        &user.email,
        user.is_staff,
        grant,
        &jwt_config(),
    )
    .unwrap()
}

pub fn token(user: &User) -> String {
    token_for(user, AccessGrant::default())
}
