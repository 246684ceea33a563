//! Account field visibility settings.
//!
//! Decides which profile fields other users may see. The certificate list
//! endpoint consults it for the `course_certificates` field.
//!
//! # Environment Variables
//!
//! - `ACCOUNT_DEFAULT_VISIBILITY`: privacy applied when a user has no
//!   `account_privacy` preference (default `all_users`)
//! - `PARENTAL_CONSENT_AGE_LIMIT`: users younger than this are always
//!   private; `none` disables the check (default `13`)

use std::env;

pub const PRIVATE_VISIBILITY: &str = "private";
pub const ALL_USERS_VISIBILITY: &str = "all_users";
pub const CUSTOM_VISIBILITY: &str = "custom";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountVisibilityConfig {
    pub default_visibility: String,
    /// Fields everyone can see, even on a private profile.
    pub public_fields: Vec<String>,
    /// Fields shown when the profile is shared with all users.
    pub bulk_shareable_fields: Vec<String>,
    /// Fields a user may share one by one under `custom` privacy.
    pub custom_shareable_fields: Vec<String>,
    pub parental_consent_age_limit: Option<i32>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for AccountVisibilityConfig {
    fn default() -> Self {
        let public_fields = strings(&["account_privacy", "profile_image", "username"]);
        let shareable = strings(&[
            "bio",
            "course_certificates",
            "country",
            "date_joined",
            "language_proficiencies",
            "level_of_education",
            "social_links",
            "time_zone",
        ]);

        let mut bulk_shareable_fields = public_fields.clone();
        bulk_shareable_fields.extend(shareable.iter().cloned());

        Self {
            default_visibility: ALL_USERS_VISIBILITY.to_string(),
            public_fields,
            bulk_shareable_fields,
            custom_shareable_fields: shareable,
            parental_consent_age_limit: Some(13),
        }
    }
}

impl AccountVisibilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_visibility: env::var("ACCOUNT_DEFAULT_VISIBILITY")
                .unwrap_or(defaults.default_visibility),
            parental_consent_age_limit: match env::var("PARENTAL_CONSENT_AGE_LIMIT") {
                Ok(v) if v.eq_ignore_ascii_case("none") => None,
                Ok(v) => v.parse().ok().or(defaults.parental_consent_age_limit),
                Err(_) => defaults.parental_consent_age_limit,
            },
            ..defaults
        }
    }
}
