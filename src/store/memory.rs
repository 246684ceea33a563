use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use openlms_core::AppError;
use openlms_models::{
    AccessTokenRecord, CourseKey, CourseOverview, Enrollment, GeneratedCertificate,
    SessionRecord, User, UserId, UserProfile,
};

use super::{CoursewareStore, StoreResult};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    profiles: HashMap<UserId, UserProfile>,
    preferences: HashMap<UserId, HashMap<String, String>>,
    course_overviews: HashMap<CourseKey, CourseOverview>,
    certificates: HashMap<(UserId, CourseKey), GeneratedCertificate>,
    enrollments: HashMap<(UserId, CourseKey), Enrollment>,
    access_tokens: HashMap<String, AccessTokenRecord>,
    sessions: HashMap<String, SessionRecord>,
}

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::internal_error("memory store lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::internal_error("memory store lock poisoned"))
    }
}

#[async_trait]
impl CoursewareStore for MemoryStore {
    async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "username {} already exists",
                user.username
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn profile(&self, user_id: UserId) -> StoreResult<Option<UserProfile>> {
        Ok(self.read()?.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.write()?
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn preferences(&self, user_id: UserId) -> StoreResult<HashMap<String, String>> {
        Ok(self
            .read()?
            .preferences
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_preference(&self, user_id: UserId, key: &str, value: &str) -> StoreResult<()> {
        self.write()?
            .preferences
            .entry(user_id)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn course_overview(&self, course_id: &CourseKey) -> StoreResult<Option<CourseOverview>> {
        Ok(self.read()?.course_overviews.get(course_id).cloned())
    }

    async fn course_overviews(&self, course_ids: &[CourseKey]) -> StoreResult<Vec<CourseOverview>> {
        let tables = self.read()?;
        Ok(course_ids
            .iter()
            .filter_map(|id| tables.course_overviews.get(id).cloned())
            .collect())
    }

    async fn upsert_course_overview(&self, overview: &CourseOverview) -> StoreResult<()> {
        self.write()?
            .course_overviews
            .insert(overview.id.clone(), overview.clone());
        Ok(())
    }

    async fn certificate(
        &self,
        user_id: UserId,
        course_id: &CourseKey,
    ) -> StoreResult<Option<GeneratedCertificate>> {
        Ok(self
            .read()?
            .certificates
            .get(&(user_id, course_id.clone()))
            .cloned())
    }

    async fn certificates(&self, user_id: UserId) -> StoreResult<Vec<GeneratedCertificate>> {
        let mut certificates: Vec<_> = self
            .read()?
            .certificates
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        certificates.sort_by_key(|c| c.created_at);
        Ok(certificates)
    }

    async fn upsert_certificate(&self, certificate: &GeneratedCertificate) -> StoreResult<()> {
        self.write()?.certificates.insert(
            (certificate.user_id, certificate.course_id.clone()),
            certificate.clone(),
        );
        Ok(())
    }

    async fn enrollment(
        &self,
        user_id: UserId,
        course_id: &CourseKey,
    ) -> StoreResult<Option<Enrollment>> {
        Ok(self
            .read()?
            .enrollments
            .get(&(user_id, course_id.clone()))
            .cloned())
    }

    async fn upsert_enrollment(&self, enrollment: &Enrollment) -> StoreResult<()> {
        let mut tables = self.write()?;
        let key = (enrollment.user_id, enrollment.course_id.clone());
        match tables.enrollments.get_mut(&key) {
            Some(existing) => {
                existing.mode = enrollment.mode.clone();
                existing.is_active = enrollment.is_active;
            }
            None => {
                tables.enrollments.insert(key, enrollment.clone());
            }
        }
        Ok(())
    }

    async fn access_token(&self, token_hash: &str) -> StoreResult<Option<AccessTokenRecord>> {
        Ok(self.read()?.access_tokens.get(token_hash).cloned())
    }

    async fn insert_access_token(&self, token: &AccessTokenRecord) -> StoreResult<()> {
        self.write()?
            .access_tokens
            .insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn session(&self, session_hash: &str) -> StoreResult<Option<SessionRecord>> {
        Ok(self.read()?.sessions.get(session_hash).cloned())
    }

    async fn insert_session(&self, session: &SessionRecord) -> StoreResult<()> {
        self.write()?
            .sessions
            .insert(session.session_hash.clone(), session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use openlms_models::{CertificateId, CertificateStatus, CourseMode, EnrollmentId};

    use super::*;

    fn user(username: &str) -> User {
        User {
            id: UserId::new(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: String::new(),
            is_staff: false,
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&user("alice")).await.unwrap();
        assert!(store.insert_user(&user("alice")).await.is_err());
        assert!(store.user_by_username("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_certificates_ordered_by_creation() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let now = Utc::now();

        for (run, age_days) in [("Second", 1), ("First", 5), ("Third", 0)] {
            store
                .upsert_certificate(&GeneratedCertificate {
                    id: CertificateId::new(),
                    user_id: alice.id,
                    course_id: CourseKey::new("edX", "Demo", run).unwrap(),
                    mode: CourseMode::Verified,
                    status: CertificateStatus::Downloadable,
                    grade: "0.9".to_string(),
                    download_url: String::new(),
                    verify_uuid: String::new(),
                    created_at: now - Duration::days(age_days),
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        let runs: Vec<_> = store
            .certificates(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.course_id.run().to_string())
            .collect();
        assert_eq!(runs, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_upsert_enrollment_keeps_identity() {
        let store = MemoryStore::new();
        let alice = user("alice");
        let course = CourseKey::new("edX", "Demo", "2024").unwrap();
        let first = Enrollment {
            id: EnrollmentId::new(),
            user_id: alice.id,
            course_id: course.clone(),
            mode: CourseMode::Audit,
            is_active: true,
            created_at: Utc::now(),
        };
        store.upsert_enrollment(&first).await.unwrap();
        store
            .upsert_enrollment(&Enrollment {
                id: EnrollmentId::new(),
                mode: CourseMode::Verified,
                ..first.clone()
            })
            .await
            .unwrap();

        let stored = store.enrollment(alice.id, &course).await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.mode, CourseMode::Verified);
    }
}
