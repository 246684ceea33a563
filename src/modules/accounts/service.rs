//! Which profile fields a user shares with other users.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use tracing::instrument;

use openlms_config::{
    ALL_USERS_VISIBILITY, AccountVisibilityConfig, CUSTOM_VISIBILITY, PRIVATE_VISIBILITY,
};
use openlms_core::AppError;
use openlms_models::{
    User, UserProfile,
    users::{ACCOUNT_PRIVACY_PREFERENCE, visibility_preference_key},
};

use crate::store::CoursewareStore;

pub struct AccountService;

impl AccountService {
    /// The privacy level in force for a user.
    ///
    /// Users who need parental consent are always private. A user without a
    /// profile has no known year of birth, so the same applies whenever an
    /// age limit is configured.
    pub fn privacy_level<'a>(
        profile: Option<&UserProfile>,
        preferences: &'a HashMap<String, String>,
        config: &'a AccountVisibilityConfig,
        current_year: i32,
    ) -> &'a str {
        let limit = config.parental_consent_age_limit;
        let needs_consent = match profile {
            Some(profile) => profile.requires_parental_consent(limit, current_year),
            None => limit.is_some(),
        };
        if needs_consent {
            return PRIVATE_VISIBILITY;
        }

        preferences
            .get(ACCOUNT_PRIVACY_PREFERENCE)
            .map(String::as_str)
            .unwrap_or(config.default_visibility.as_str())
    }

    pub fn visible_fields(
        profile: Option<&UserProfile>,
        preferences: &HashMap<String, String>,
        config: &AccountVisibilityConfig,
        current_year: i32,
    ) -> Vec<String> {
        match Self::privacy_level(profile, preferences, config, current_year) {
            ALL_USERS_VISIBILITY => config.bulk_shareable_fields.clone(),
            CUSTOM_VISIBILITY => {
                let mut fields = config.public_fields.clone();
                fields.extend(
                    config
                        .custom_shareable_fields
                        .iter()
                        .filter(|field| {
                            preferences
                                .get(&visibility_preference_key(field))
                                .is_some_and(|v| v == ALL_USERS_VISIBILITY)
                        })
                        .cloned(),
                );
                fields
            }
            _ => config.public_fields.clone(),
        }
    }

    /// Loads the user's profile and preferences and computes
    /// [`visible_fields`](Self::visible_fields).
    #[instrument(skip(store, config, user), fields(user_id = %user.id))]
    pub async fn visible_fields_for_user(
        store: &dyn CoursewareStore,
        config: &AccountVisibilityConfig,
        user: &User,
    ) -> Result<Vec<String>, AppError> {
        let profile = store.profile(user.id).await?;
        let preferences = store.preferences(user.id).await?;
        Ok(Self::visible_fields(
            profile.as_ref(),
            &preferences,
            config,
            Utc::now().year(),
        ))
    }
}
