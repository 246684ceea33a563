//! Course overviews, enrollments and certificates.

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::company::en::CatchPhrase;
use uuid::Uuid;

use openlms::store::CoursewareStore;
use openlms_core::AppError;
use openlms_models::{
    CertificateId, CertificateStatus, CertificatesDisplayBehavior, CourseKey, CourseMode,
    CourseOverview, Enrollment, EnrollmentId, GeneratedCertificate, UserId,
};

const ORGS: [&str; 4] = ["edX", "MITx", "HarvardX", "DemoX"];

const SEED_MODES: [CourseMode; 4] = [
    CourseMode::Audit,
    CourseMode::Honor,
    CourseMode::Verified,
    CourseMode::Professional,
];

/// Builds `count` courses. Even-numbered courses have already ended so their
/// certificates are viewable; odd ones end in the future.
pub fn generate_courses(count: usize) -> Result<Vec<CourseOverview>, AppError> {
    let now = Utc::now();
    (0..count)
        .map(|idx| {
            let org = ORGS[idx % ORGS.len()];
            let key = CourseKey::new(org, &format!("CS{}", 101 + idx), "2025_T1")
                .map_err(AppError::internal)?;
            let title: String = CatchPhrase().fake();
            let start_offset: i64 = (60..365).fake();

            let mut overview = CourseOverview::new(key);
            overview.display_name = Some(title);
            overview.display_org = Some(org.to_string());
            overview.start_date = Some(now - Duration::days(start_offset));
            overview.end_date = if idx % 2 == 0 {
                Some(now - Duration::days(7))
            } else {
                Some(now + Duration::days(30))
            };
            overview.certificates_display_behavior = CertificatesDisplayBehavior::EarlyNoInfo;
            overview.cert_html_view_enabled = true;
            Ok(overview)
        })
        .collect()
}

pub async fn insert_courses(
    store: &dyn CoursewareStore,
    courses: &[CourseOverview],
) -> Result<(), AppError> {
    for course in courses {
        store.upsert_course_overview(course).await?;
    }
    Ok(())
}

/// Enrolls every user in up to `per_user` courses, rotating the starting
/// course so enrollments spread evenly. Returns enrollments and certificates
/// created.
pub async fn enroll_and_certify(
    store: &dyn CoursewareStore,
    users: &[UserId],
    courses: &[CourseOverview],
    per_user: usize,
) -> Result<(usize, usize), AppError> {
    if courses.is_empty() {
        return Ok((0, 0));
    }

    let per_user = per_user.min(courses.len());
    let now = Utc::now();
    let mut enrollments = 0;
    let mut certificates = 0;

    for (user_idx, user_id) in users.iter().enumerate() {
        for offset in 0..per_user {
            let course = &courses[(user_idx + offset) % courses.len()];
            let mode = SEED_MODES[(user_idx + offset) % SEED_MODES.len()].clone();
            let enrolled_days_ago: i64 = (10..60).fake();

            store
                .upsert_enrollment(&Enrollment {
                    id: EnrollmentId::new(),
                    user_id: *user_id,
                    course_id: course.id.clone(),
                    mode: mode.clone(),
                    is_active: true,
                    created_at: now - Duration::days(enrolled_days_ago),
                })
                .await?;
            enrollments += 1;

            // Finished courses hand out certificates to most learners.
            if !course.has_ended(now) || (user_idx + offset) % 3 == 2 {
                continue;
            }
            let status = if mode == CourseMode::Audit {
                CertificateStatus::AuditPassing
            } else {
                CertificateStatus::Downloadable
            };
            let grade: u32 = (60..100).fake();
            store
                .upsert_certificate(&GeneratedCertificate {
                    id: CertificateId::new(),
                    user_id: *user_id,
                    course_id: course.id.clone(),
                    mode,
                    status,
                    grade: format!("0.{grade}"),
                    download_url: String::new(),
                    verify_uuid: Uuid::new_v4().simple().to_string(),
                    created_at: now - Duration::days(3),
                    updated_at: now - Duration::days(3),
                })
                .await?;
            certificates += 1;
        }
    }

    Ok((enrollments, certificates))
}
