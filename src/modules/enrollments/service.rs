use chrono::Utc;
use tracing::instrument;

use openlms_core::AppError;
use openlms_models::{CourseKey, CourseMode, Enrollment, EnrollmentId, UserId};

use crate::store::CoursewareStore;

pub struct EnrollmentService;

impl EnrollmentService {
    /// Enrolls the user, reactivating an existing enrollment and switching it
    /// to `mode`.
    #[instrument(skip(store))]
    pub async fn enroll(
        store: &dyn CoursewareStore,
        user_id: UserId,
        course_id: &CourseKey,
        mode: CourseMode,
    ) -> Result<Enrollment, AppError> {
        let enrollment = match store.enrollment(user_id, course_id).await? {
            Some(existing) => Enrollment {
                mode,
                is_active: true,
                ..existing
            },
            None => Enrollment {
                id: EnrollmentId::new(),
                user_id,
                course_id: course_id.clone(),
                mode,
                is_active: true,
                created_at: Utc::now(),
            },
        };

        store.upsert_enrollment(&enrollment).await?;
        tracing::info!(%user_id, %course_id, mode = %enrollment.mode, "user enrolled");
        Ok(enrollment)
    }

    /// Deactivates the enrollment. Returns `None` if the user was never
    /// enrolled.
    #[instrument(skip(store))]
    pub async fn unenroll(
        store: &dyn CoursewareStore,
        user_id: UserId,
        course_id: &CourseKey,
    ) -> Result<Option<Enrollment>, AppError> {
        let Some(existing) = store.enrollment(user_id, course_id).await? else {
            return Ok(None);
        };

        let enrollment = Enrollment {
            is_active: false,
            ..existing
        };
        store.upsert_enrollment(&enrollment).await?;
        tracing::info!(%user_id, %course_id, "user unenrolled");
        Ok(Some(enrollment))
    }

    /// `(mode, is_active)` of the user's enrollment, if there is one.
    pub async fn enrollment_mode_for_user(
        store: &dyn CoursewareStore,
        user_id: UserId,
        course_id: &CourseKey,
    ) -> Result<Option<(CourseMode, bool)>, AppError> {
        Ok(store
            .enrollment(user_id, course_id)
            .await?
            .map(|enrollment| (enrollment.mode, enrollment.is_active)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn course() -> CourseKey {
        "course-v1:edX+DemoX+Demo".parse().unwrap()
    }

    #[tokio::test]
    async fn test_enroll_then_unenroll() {
        let store = MemoryStore::new();
        let user_id = UserId::new();

        let enrollment = EnrollmentService::enroll(&store, user_id, &course(), CourseMode::Audit)
            .await
            .unwrap();
        assert!(enrollment.is_active);
        assert_eq!(
            EnrollmentService::enrollment_mode_for_user(&store, user_id, &course())
                .await
                .unwrap(),
            Some((CourseMode::Audit, true))
        );

        EnrollmentService::unenroll(&store, user_id, &course())
            .await
            .unwrap();
        assert_eq!(
            EnrollmentService::enrollment_mode_for_user(&store, user_id, &course())
                .await
                .unwrap(),
            Some((CourseMode::Audit, false))
        );
    }

    #[tokio::test]
    async fn test_reenroll_reactivates_and_updates_mode() {
        let store = MemoryStore::new();
        let user_id = UserId::new();

        let first = EnrollmentService::enroll(&store, user_id, &course(), CourseMode::Audit)
            .await
            .unwrap();
        EnrollmentService::unenroll(&store, user_id, &course())
            .await
            .unwrap();
        let second = EnrollmentService::enroll(&store, user_id, &course(), CourseMode::Verified)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.is_active);
        assert_eq!(second.mode, CourseMode::Verified);
    }

    #[tokio::test]
    async fn test_unenroll_without_enrollment() {
        let store = MemoryStore::new();
        assert!(
            EnrollmentService::unenroll(&store, UserId::new(), &course())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            EnrollmentService::enrollment_mode_for_user(&store, UserId::new(), &course())
                .await
                .unwrap()
                .is_none()
        );
    }
}
