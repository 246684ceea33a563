use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use openlms_core::serde::{deserialize_flexible_bool, deserialize_optional_string};

use super::rules::RuleContext;

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PermissionQuery {
    /// Course the permission is checked in.
    pub course_id: String,
    /// Proctoring backend of the exam.
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub backend: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_bool")]
    #[param(value_type = Option<bool>)]
    pub is_proctored: bool,
}

impl From<PermissionQuery> for RuleContext {
    fn from(query: PermissionQuery) -> Self {
        RuleContext {
            course_id: query.course_id,
            backend: query.backend,
            is_proctored: query.is_proctored,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionResponse {
    #[schema(example = "edx_proctoring.can_take_proctored_exam")]
    pub permission: String,
    #[schema(example = "course-v1:edX+DemoX+Demo_Course")]
    pub course_id: String,
    pub allowed: bool,
}
