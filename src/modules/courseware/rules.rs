//! Named permission rules.
//!
//! A [`RuleRegistry`] maps permission names to [`Rule`]s. Callers ask
//! [`RuleRegistry::has_perm`] whether a user holds a permission in a given
//! [`RuleContext`]:
//!
//! ```ignore
//! let context = RuleContext::new("course-v1:edX+DemoX+Demo")
//!     .backend("proctortrack")
//!     .proctored(true);
//!
//! let allowed = state
//!     .rules
//!     .has_perm(&state, &user, CAN_TAKE_PROCTORED_EXAM, &context)
//!     .await?;
//! ```
//!
//! Active superusers hold every permission. Names with no registered rule
//! are denied.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use tracing::instrument;

use openlms_core::{AppError, permissions::CAN_TAKE_PROCTORED_EXAM};
use openlms_models::{CourseKey, CourseMode, User};

use crate::metrics::track_rule_evaluation;
use crate::modules::enrollments::service::EnrollmentService;
use crate::state::AppState;

/// The object a permission is checked against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleContext {
    pub course_id: String,
    pub backend: Option<String>,
    pub is_proctored: bool,
}

impl RuleContext {
    pub fn new(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            ..Self::default()
        }
    }

    pub fn backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    pub fn proctored(mut self, is_proctored: bool) -> Self {
        self.is_proctored = is_proctored;
        self
    }
}

#[async_trait]
pub trait Rule: Send + Sync {
    async fn check(&self, state: &AppState, user: &User, ctx: &RuleContext)
    -> Result<bool, AppError>;
}

/// Enrollment modes that may sit proctored exams without further conditions.
const PROCTORED_EXAM_MODES: [CourseMode; 4] = [
    CourseMode::Verified,
    CourseMode::Masters,
    CourseMode::Professional,
    CourseMode::ExecutiveEducation,
];

/// The learner's enrollment track allows proctored exams.
///
/// Honor enrollments qualify only for proctored exams on a backend that
/// sets `allow_honor_mode`.
pub struct IsTrackOkForExam;

#[async_trait]
impl Rule for IsTrackOkForExam {
    async fn check(
        &self,
        state: &AppState,
        user: &User,
        ctx: &RuleContext,
    ) -> Result<bool, AppError> {
        let Ok(course_id) = ctx.course_id.parse::<CourseKey>() else {
            return Ok(false);
        };

        let Some((mode, is_active)) =
            EnrollmentService::enrollment_mode_for_user(state.store.as_ref(), user.id, &course_id)
                .await?
        else {
            return Ok(false);
        };

        let honor_allowed = ctx.is_proctored
            && ctx
                .backend
                .as_deref()
                .is_some_and(|backend| state.proctoring_config.allows_honor_mode(backend));

        let mode_ok = PROCTORED_EXAM_MODES.contains(&mode)
            || (mode == CourseMode::Honor && honor_allowed);

        Ok(is_active && mode_ok)
    }
}

pub struct RuleRegistry {
    rules: HashMap<&'static str, Box<dyn Rule>>,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("RuleRegistry").field("rules", &names).finish()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(CAN_TAKE_PROCTORED_EXAM, IsTrackOkForExam);
        registry
    }
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Registers `rule` under `name`, replacing any previous rule.
    pub fn register(&mut self, name: &'static str, rule: impl Rule + 'static) {
        self.rules.insert(name, Box::new(rule));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    #[instrument(skip(self, state, user), fields(user_id = %user.id))]
    pub async fn has_perm(
        &self,
        state: &AppState,
        user: &User,
        name: &str,
        ctx: &RuleContext,
    ) -> Result<bool, AppError> {
        let granted = if user.is_active_superuser() {
            true
        } else {
            match self.rules.get(name) {
                Some(rule) => rule.check(state, user, ctx).await?,
                None => {
                    tracing::debug!(permission = name, "no rule registered");
                    false
                }
            }
        };

        track_rule_evaluation(name, granted);
        Ok(granted)
    }
}
