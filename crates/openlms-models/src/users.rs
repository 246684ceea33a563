//! Users, profiles and account preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::UserId;

/// Preference holding the profile privacy level (`private`, `all_users` or
/// `custom`).
pub const ACCOUNT_PRIVACY_PREFERENCE: &str = "account_privacy";

/// Prefix of per-field visibility preferences used under `custom` privacy,
/// e.g. `visibility.course_certificates`.
pub const VISIBILITY_PREFERENCE_PREFIX: &str = "visibility.";

pub fn visibility_preference_key(field: &str) -> String {
    format!("{VISIBILITY_PREFERENCE_PREFIX}{field}")
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Superuser privileges only apply to active accounts.
    pub fn is_active_superuser(&self) -> bool {
        self.is_active && self.is_superuser
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub year_of_birth: Option<i32>,
}

impl UserProfile {
    /// Whether the user is too young (or has not told us their age) to share
    /// anything beyond the public profile fields.
    ///
    /// Only the birth year is known, so the age is taken as the lower bound
    /// `current_year - year_of_birth - 1`. `age_limit` of `None` disables
    /// the check.
    pub fn requires_parental_consent(&self, age_limit: Option<i32>, current_year: i32) -> bool {
        let Some(limit) = age_limit else {
            return false;
        };
        match self.year_of_birth {
            Some(year) => current_year - year - 1 < limit,
            None => true,
        }
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct UserPreference {
    pub user_id: UserId,
    pub key: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(year_of_birth: Option<i32>) -> UserProfile {
        UserProfile {
            user_id: UserId::new(),
            name: "Test".to_string(),
            year_of_birth,
        }
    }

    #[test]
    fn test_parental_consent() {
        assert!(profile(None).requires_parental_consent(Some(13), 2026));
        assert!(profile(Some(2020)).requires_parental_consent(Some(13), 2026));
        // May still be 12 until their birthday this year.
        assert!(profile(Some(2013)).requires_parental_consent(Some(13), 2026));
        assert!(!profile(Some(2012)).requires_parental_consent(Some(13), 2026));
        assert!(!profile(Some(1990)).requires_parental_consent(Some(13), 2026));
        assert!(!profile(None).requires_parental_consent(None, 2026));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: UserId::new(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "secret".to_string(),
            is_staff: false,
            is_superuser: false,
            is_active: true,
            date_joined: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_visibility_preference_key() {
        assert_eq!(
            visibility_preference_key("course_certificates"),
            "visibility.course_certificates"
        );
    }
}
