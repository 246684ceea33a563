//! Data access seam for courseware data.
//!
//! Services only talk to [`CoursewareStore`]. [`PgStore`] backs the running
//! service; [`MemoryStore`] backs tests and local demos.

use std::collections::HashMap;

use async_trait::async_trait;
use openlms_core::AppError;
use openlms_models::{
    AccessTokenRecord, CourseKey, CourseOverview, Enrollment, GeneratedCertificate,
    SessionRecord, User, UserId, UserProfile,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait CoursewareStore: Send + Sync {
    async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    async fn profile(&self, user_id: UserId) -> StoreResult<Option<UserProfile>>;
    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()>;

    /// All preferences of a user, keyed by preference name.
    async fn preferences(&self, user_id: UserId) -> StoreResult<HashMap<String, String>>;
    async fn set_preference(&self, user_id: UserId, key: &str, value: &str) -> StoreResult<()>;

    async fn course_overview(&self, course_id: &CourseKey) -> StoreResult<Option<CourseOverview>>;
    /// Overviews for the given keys. Keys without an overview are skipped.
    async fn course_overviews(&self, course_ids: &[CourseKey]) -> StoreResult<Vec<CourseOverview>>;
    async fn upsert_course_overview(&self, overview: &CourseOverview) -> StoreResult<()>;

    async fn certificate(
        &self,
        user_id: UserId,
        course_id: &CourseKey,
    ) -> StoreResult<Option<GeneratedCertificate>>;
    /// Every certificate of a user, oldest first.
    async fn certificates(&self, user_id: UserId) -> StoreResult<Vec<GeneratedCertificate>>;
    async fn upsert_certificate(&self, certificate: &GeneratedCertificate) -> StoreResult<()>;

    async fn enrollment(
        &self,
        user_id: UserId,
        course_id: &CourseKey,
    ) -> StoreResult<Option<Enrollment>>;
    /// Inserts or replaces the enrollment for `(user_id, course_id)`.
    async fn upsert_enrollment(&self, enrollment: &Enrollment) -> StoreResult<()>;

    async fn access_token(&self, token_hash: &str) -> StoreResult<Option<AccessTokenRecord>>;
    async fn insert_access_token(&self, token: &AccessTokenRecord) -> StoreResult<()>;

    async fn session(&self, session_hash: &str) -> StoreResult<Option<SessionRecord>>;
    async fn insert_session(&self, session: &SessionRecord) -> StoreResult<()>;
}
