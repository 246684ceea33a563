mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{DEMO_COURSE, TestApp, body_json, create_user, enroll, get, token};
use openlms::modules::courseware::RuleContext;
use openlms::store::CoursewareStore;
use openlms_config::{ProctoringBackendConfig, ProctoringConfig};
use openlms_core::permissions::CAN_TAKE_PROCTORED_EXAM;
use openlms_models::{CourseMode, User, UserId};

const HONOR_BACKEND: &str = "mock_proctoring_allow_honor_mode";
const STRICT_BACKEND: &str = "mock";

fn proctoring() -> ProctoringConfig {
    ProctoringConfig::default()
        .with_backend(STRICT_BACKEND, ProctoringBackendConfig::default())
        .with_backend(
            HONOR_BACKEND,
            ProctoringBackendConfig {
                allow_honor_mode: true,
                ..ProctoringBackendConfig::default()
            },
        )
}

fn permission_uri(query: &str) -> String {
    format!("/api/courseware/v1/permissions/{CAN_TAKE_PROCTORED_EXAM}?{query}")
}

/// The course key with `:` and `+` escaped for use in a query string.
fn encoded_course() -> String {
    DEMO_COURSE.replace(':', "%3A").replace('+', "%2B")
}

async fn can_take(app: &TestApp, user: &User, ctx: RuleContext) -> bool {
    app.state
        .rules
        .has_perm(&app.state, user, CAN_TAKE_PROCTORED_EXAM, &ctx)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_enrollment_modes() {
    let cases = [
        (CourseMode::Verified, true),
        (CourseMode::Masters, true),
        (CourseMode::Professional, true),
        (CourseMode::ExecutiveEducation, true),
        (CourseMode::Honor, false),
        (CourseMode::Audit, false),
        (CourseMode::Credit, false),
        (CourseMode::NoIdProfessional, false),
    ];

    for (mode, expected) in cases {
        let app = TestApp::with_proctoring(proctoring());
        let bob = create_user(app.store.as_ref(), "bob", false).await;
        enroll(app.store.as_ref(), &bob, DEMO_COURSE, mode.clone()).await;

        let ctx = RuleContext::new(DEMO_COURSE)
            .backend(STRICT_BACKEND)
            .proctored(true);
        assert_eq!(can_take(&app, &bob, ctx).await, expected, "mode: {mode}");
    }
}

#[tokio::test]
async fn test_honor_mode_needs_proctored_exam_on_permissive_backend() {
    let app = TestApp::with_proctoring(proctoring());
    let bob = create_user(app.store.as_ref(), "bob", false).await;
    enroll(app.store.as_ref(), &bob, DEMO_COURSE, CourseMode::Honor).await;

    let cases = [
        (Some(HONOR_BACKEND), true, true),
        (Some(HONOR_BACKEND), false, false),
        (Some(STRICT_BACKEND), true, false),
        (Some("unknown"), true, false),
        (None, true, false),
    ];

    for (backend, proctored, expected) in cases {
        let mut ctx = RuleContext::new(DEMO_COURSE).proctored(proctored);
        if let Some(backend) = backend {
            ctx = ctx.backend(backend);
        }
        assert_eq!(
            can_take(&app, &bob, ctx.clone()).await,
            expected,
            "context: {ctx:?}"
        );
    }
}

#[tokio::test]
async fn test_unrecognized_enrollment_mode_is_denied() {
    let app = TestApp::with_proctoring(proctoring());
    let bob = create_user(app.store.as_ref(), "bob", false).await;
    enroll(
        app.store.as_ref(),
        &bob,
        DEMO_COURSE,
        CourseMode::Other("bogus".to_string()),
    )
    .await;

    let ctx = RuleContext::new(DEMO_COURSE)
        .backend(HONOR_BACKEND)
        .proctored(true);
    assert!(!can_take(&app, &bob, ctx).await);

    let query = format!(
        "course_id={}&backend={HONOR_BACKEND}&is_proctored=true",
        encoded_course()
    );
    let response = app.send(get(&permission_uri(&query), Some(&token(&bob)))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["allowed"], false);
}

#[tokio::test]
async fn test_not_enrolled_or_inactive_enrollment() {
    let app = TestApp::with_proctoring(proctoring());
    let bob = create_user(app.store.as_ref(), "bob", false).await;
    let ctx = RuleContext::new(DEMO_COURSE).proctored(true);

    assert!(!can_take(&app, &bob, ctx.clone()).await);

    enroll(app.store.as_ref(), &bob, DEMO_COURSE, CourseMode::Verified).await;
    assert!(can_take(&app, &bob, ctx.clone()).await);

    let mut enrollment = app
        .store
        .enrollment(bob.id, &common::course_key(DEMO_COURSE))
        .await
        .unwrap()
        .unwrap();
    enrollment.is_active = false;
    app.store.upsert_enrollment(&enrollment).await.unwrap();
    assert!(!can_take(&app, &bob, ctx).await);
}

#[tokio::test]
async fn test_invalid_course_is_denied() {
    let app = TestApp::new();
    let bob = create_user(app.store.as_ref(), "bob", false).await;
    assert!(!can_take(&app, &bob, RuleContext::new("garbage").proctored(true)).await);
}

#[tokio::test]
async fn test_superuser_holds_every_permission() {
    let app = TestApp::new();
    let root = User {
        id: UserId::new(),
        username: "root".to_string(),
        email: "root@example.com".to_string(),
        password_hash: "!".to_string(),
        is_staff: true,
        is_superuser: true,
        is_active: true,
        date_joined: Utc::now(),
    };
    app.store.insert_user(&root).await.unwrap();

    assert!(can_take(&app, &root, RuleContext::new(DEMO_COURSE)).await);
    assert!(
        app.state
            .rules
            .has_perm(&app.state, &root, "anything.at_all", &RuleContext::default())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_permission_endpoint() {
    let app = TestApp::with_proctoring(proctoring());
    let bob = create_user(app.store.as_ref(), "bob", false).await;
    enroll(app.store.as_ref(), &bob, DEMO_COURSE, CourseMode::Honor).await;

    let query = format!(
        "course_id={}&backend={HONOR_BACKEND}&is_proctored=true",
        encoded_course()
    );
    let response = app.send(get(&permission_uri(&query), Some(&token(&bob)))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["permission"], CAN_TAKE_PROCTORED_EXAM);
    assert_eq!(body["course_id"], DEMO_COURSE);
    assert_eq!(body["allowed"], true);

    let query = format!("course_id={}&backend={HONOR_BACKEND}", encoded_course());
    let response = app.send(get(&permission_uri(&query), Some(&token(&bob)))).await;
    assert_eq!(body_json(response).await["allowed"], false);
}

#[tokio::test]
async fn test_permission_endpoint_unknown_permission_and_anonymous() {
    let app = TestApp::new();
    let bob = create_user(app.store.as_ref(), "bob", false).await;
    let query = format!("course_id={}", encoded_course());

    let uri = format!("/api/courseware/v1/permissions/courseware.unknown?{query}");
    let response = app.send(get(&uri, Some(&token(&bob)))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["allowed"], false);

    let response = app.send(get(&permission_uri(&query), None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
