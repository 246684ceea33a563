use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::instrument;

use openlms_config::{AccountVisibilityConfig, CertificatesConfig};
use openlms_core::AppError;
use openlms_models::{
    CertificateStatus, CourseKey, CourseOverview, GeneratedCertificate, User,
};

use super::model::{CertificateListItem, CertificateSummary};
use crate::modules::accounts::service::AccountService;
use crate::store::CoursewareStore;

const COURSE_CERTIFICATES_FIELD: &str = "course_certificates";

pub struct CertificateService;

impl CertificateService {
    /// Where a certificate can be fetched from.
    ///
    /// Only downloadable certificates have a URL: the stored PDF link, or
    /// the HTML certificate page when HTML certificates are on both
    /// globally and for the course.
    pub fn download_url(
        certificate: &GeneratedCertificate,
        overview: Option<&CourseOverview>,
        config: &CertificatesConfig,
    ) -> Option<String> {
        if certificate.status != CertificateStatus::Downloadable {
            return None;
        }
        if !certificate.download_url.is_empty() {
            return Some(certificate.download_url.clone());
        }

        let html_enabled =
            config.html_view_enabled && overview.is_some_and(|o| o.cert_html_view_enabled);
        html_enabled.then(|| config.html_certificate_url(&certificate.verify_uuid))
    }

    /// The user's certificate in a course. Audit results and unknown users
    /// yield `None`.
    #[instrument(skip(store, config))]
    pub async fn certificate_for_user(
        store: &dyn CoursewareStore,
        config: &CertificatesConfig,
        username: &str,
        course_id: &CourseKey,
    ) -> Result<Option<CertificateSummary>, AppError> {
        let Some(user) = store.user_by_username(username).await? else {
            return Ok(None);
        };
        let Some(certificate) = store
            .certificate(user.id, course_id)
            .await?
            .filter(|c| c.status.is_eligible())
        else {
            return Ok(None);
        };

        let overview = store.course_overview(course_id).await?;
        let download_url = Self::download_url(&certificate, overview.as_ref(), config);

        Ok(Some(CertificateSummary {
            username: user.username,
            certificate,
            download_url,
        }))
    }

    /// Every eligible certificate of the user, oldest first.
    #[instrument(skip(store, config, user), fields(user_id = %user.id))]
    pub async fn certificates_for_user(
        store: &dyn CoursewareStore,
        config: &CertificatesConfig,
        user: &User,
    ) -> Result<Vec<CertificateSummary>, AppError> {
        let certificates: Vec<_> = store
            .certificates(user.id)
            .await?
            .into_iter()
            .filter(|c| c.status.is_eligible())
            .collect();

        let course_ids: Vec<CourseKey> = certificates.iter().map(|c| c.course_id.clone()).collect();
        let overviews: HashMap<CourseKey, CourseOverview> = store
            .course_overviews(&course_ids)
            .await?
            .into_iter()
            .map(|o| (o.id.clone(), o))
            .collect();

        Ok(certificates
            .into_iter()
            .map(|certificate| {
                let download_url = Self::download_url(
                    &certificate,
                    overviews.get(&certificate.course_id),
                    config,
                );
                CertificateSummary {
                    username: user.username.clone(),
                    certificate,
                    download_url,
                }
            })
            .collect())
    }

    /// Whether `requestor` may see `target`'s certificate list: it is their
    /// own, they are staff, or the target shares `course_certificates`.
    pub async fn viewable_by_requestor(
        store: &dyn CoursewareStore,
        config: &AccountVisibilityConfig,
        requestor: &User,
        target: &User,
    ) -> Result<bool, AppError> {
        if requestor.username == target.username || requestor.is_staff {
            return Ok(true);
        }

        let fields = AccountService::visible_fields_for_user(store, config, target).await?;
        Ok(fields.iter().any(|f| f == COURSE_CERTIFICATES_FIELD))
    }

    /// Passing certificates of the user in courses that currently show
    /// certificates, oldest first. Empty if `requestor` may not see them or
    /// the user does not exist.
    #[instrument(skip(store, certificates_config, visibility_config, requestor), fields(requestor = %requestor.username))]
    pub async fn viewable_certificates(
        store: &dyn CoursewareStore,
        certificates_config: &CertificatesConfig,
        visibility_config: &AccountVisibilityConfig,
        requestor: &User,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<CertificateListItem>, AppError> {
        let Some(target) = store.user_by_username(username).await? else {
            return Ok(Vec::new());
        };
        if !Self::viewable_by_requestor(store, visibility_config, requestor, &target).await? {
            tracing::debug!("certificates not visible to requestor");
            return Ok(Vec::new());
        }

        let mut passing: HashMap<CourseKey, CertificateSummary> = HashMap::new();
        for summary in Self::certificates_for_user(store, certificates_config, &target).await? {
            if summary.certificate.is_passing() {
                passing.insert(summary.certificate.course_id.clone(), summary);
            }
        }

        let course_ids: Vec<CourseKey> = passing.keys().cloned().collect();
        let mut items: Vec<CertificateListItem> = store
            .course_overviews(&course_ids)
            .await?
            .into_iter()
            .filter(|overview| overview.certificates_viewable(now))
            .filter_map(|overview| {
                passing
                    .remove(&overview.id)
                    .map(|summary| CertificateListItem::new(summary, &overview))
            })
            .collect();

        items.sort_by_key(|item| item.created_date);
        Ok(items)
    }
}
