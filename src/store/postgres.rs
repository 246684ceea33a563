use std::collections::HashMap;

use async_trait::async_trait;
use openlms_models::{
    AccessTokenRecord, CourseKey, CourseOverview, Enrollment, GeneratedCertificate,
    SessionRecord, User, UserId, UserPreference, UserProfile,
};
use sqlx::PgPool;
use tracing::instrument;

use super::{CoursewareStore, StoreResult};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_staff, is_superuser, is_active, date_joined";

const OVERVIEW_COLUMNS: &str = "id, display_name, display_org, self_paced, start_date, end_date, \
     certificate_available_date, certificates_display_behavior, certificates_show_before_end, \
     cert_html_view_enabled";

const CERTIFICATE_COLUMNS: &str = "id, user_id, course_id, mode, status, grade, download_url, \
     verify_uuid, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CoursewareStore for PgStore {
    #[instrument(skip(self))]
    async fn user_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.is_active)
        .bind(user.date_joined)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn profile(&self, user_id: UserId) -> StoreResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT user_id, name, year_of_birth FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.user_id))]
    async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO user_profiles (user_id, name, year_of_birth) VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE
             SET name = EXCLUDED.name, year_of_birth = EXCLUDED.year_of_birth",
        )
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(profile.year_of_birth)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn preferences(&self, user_id: UserId) -> StoreResult<HashMap<String, String>> {
        let rows = sqlx::query_as::<_, UserPreference>(
            "SELECT user_id, key, value FROM user_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|p| (p.key, p.value)).collect())
    }

    #[instrument(skip(self))]
    async fn set_preference(&self, user_id: UserId, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO user_preferences (user_id, key, value) VALUES ($1, $2, $3)
             ON CONFLICT (user_id, key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn course_overview(&self, course_id: &CourseKey) -> StoreResult<Option<CourseOverview>> {
        let overview = sqlx::query_as::<_, CourseOverview>(&format!(
            "SELECT {OVERVIEW_COLUMNS} FROM course_overviews WHERE id = $1"
        ))
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(overview)
    }

    #[instrument(skip(self, course_ids), fields(count = course_ids.len()))]
    async fn course_overviews(&self, course_ids: &[CourseKey]) -> StoreResult<Vec<CourseOverview>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = course_ids.iter().map(ToString::to_string).collect();
        let overviews = sqlx::query_as::<_, CourseOverview>(&format!(
            "SELECT {OVERVIEW_COLUMNS} FROM course_overviews WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(overviews)
    }

    #[instrument(skip(self, overview), fields(course_id = %overview.id))]
    async fn upsert_course_overview(&self, overview: &CourseOverview) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO course_overviews ({OVERVIEW_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                display_org = EXCLUDED.display_org,
                self_paced = EXCLUDED.self_paced,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                certificate_available_date = EXCLUDED.certificate_available_date,
                certificates_display_behavior = EXCLUDED.certificates_display_behavior,
                certificates_show_before_end = EXCLUDED.certificates_show_before_end,
                cert_html_view_enabled = EXCLUDED.cert_html_view_enabled"
        ))
        .bind(&overview.id)
        .bind(&overview.display_name)
        .bind(&overview.display_org)
        .bind(overview.self_paced)
        .bind(overview.start_date)
        .bind(overview.end_date)
        .bind(overview.certificate_available_date)
        .bind(overview.certificates_display_behavior)
        .bind(overview.certificates_show_before_end)
        .bind(overview.cert_html_view_enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn certificate(
        &self,
        user_id: UserId,
        course_id: &CourseKey,
    ) -> StoreResult<Option<GeneratedCertificate>> {
        let certificate = sqlx::query_as::<_, GeneratedCertificate>(&format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM generated_certificates
             WHERE user_id = $1 AND course_id = $2"
        ))
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(certificate)
    }

    #[instrument(skip(self))]
    async fn certificates(&self, user_id: UserId) -> StoreResult<Vec<GeneratedCertificate>> {
        let certificates = sqlx::query_as::<_, GeneratedCertificate>(&format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM generated_certificates
             WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(certificates)
    }

    #[instrument(skip(self, certificate), fields(course_id = %certificate.course_id))]
    async fn upsert_certificate(&self, certificate: &GeneratedCertificate) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO generated_certificates ({CERTIFICATE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (user_id, course_id) DO UPDATE SET
                mode = EXCLUDED.mode,
                status = EXCLUDED.status,
                grade = EXCLUDED.grade,
                download_url = EXCLUDED.download_url,
                verify_uuid = EXCLUDED.verify_uuid,
                updated_at = EXCLUDED.updated_at"
        ))
        .bind(certificate.id)
        .bind(certificate.user_id)
        .bind(&certificate.course_id)
        .bind(&certificate.mode)
        .bind(&certificate.status)
        .bind(&certificate.grade)
        .bind(&certificate.download_url)
        .bind(&certificate.verify_uuid)
        .bind(certificate.created_at)
        .bind(certificate.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn enrollment(
        &self,
        user_id: UserId,
        course_id: &CourseKey,
    ) -> StoreResult<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(
            "SELECT id, user_id, course_id, mode, is_active, created_at
             FROM course_enrollments WHERE user_id = $1 AND course_id = $2",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(enrollment)
    }

    #[instrument(skip(self, enrollment), fields(course_id = %enrollment.course_id))]
    async fn upsert_enrollment(&self, enrollment: &Enrollment) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO course_enrollments (id, user_id, course_id, mode, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, course_id) DO UPDATE
             SET mode = EXCLUDED.mode, is_active = EXCLUDED.is_active",
        )
        .bind(enrollment.id)
        .bind(enrollment.user_id)
        .bind(&enrollment.course_id)
        .bind(&enrollment.mode)
        .bind(enrollment.is_active)
        .bind(enrollment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn access_token(&self, token_hash: &str) -> StoreResult<Option<AccessTokenRecord>> {
        let token = sqlx::query_as::<_, AccessTokenRecord>(
            "SELECT token_hash, user_id, scope, expires_at
             FROM oauth2_access_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    #[instrument(skip_all, fields(user_id = %token.user_id))]
    async fn insert_access_token(&self, token: &AccessTokenRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO oauth2_access_tokens (token_hash, user_id, scope, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&token.token_hash)
        .bind(token.user_id)
        .bind(&token.scope)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn session(&self, session_hash: &str) -> StoreResult<Option<SessionRecord>> {
        let session = sqlx::query_as::<_, SessionRecord>(
            "SELECT session_hash, user_id, expires_at FROM sessions WHERE session_hash = $1",
        )
        .bind(session_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    #[instrument(skip_all, fields(user_id = %session.user_id))]
    async fn insert_session(&self, session: &SessionRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO sessions (session_hash, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(&session.session_hash)
        .bind(session.user_id)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
