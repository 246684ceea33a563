//! Fake learners with profiles and privacy preferences.

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};

use openlms::store::CoursewareStore;
use openlms_config::{ALL_USERS_VISIBILITY, PRIVATE_VISIBILITY};
use openlms_core::AppError;
use openlms_models::{User, UserId, UserProfile, users::ACCOUNT_PRIVACY_PREFERENCE};

/// A generated user and the profile that goes with it.
pub struct UserSeed {
    pub user: User,
    pub profile: UserProfile,
    pub privacy: &'static str,
}

/// Builds `count` learners. Usernames carry the index so reruns with the
/// same names do not collide within one batch.
pub fn generate_users(count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let username = format!(
                "{}_{}{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                idx
            )
            .replace(|c: char| !c.is_ascii_alphanumeric() && c != '_', "");

            let id = UserId::new();
            let days_ago: i64 = (1..720).fake();
            let year_of_birth: i32 = (1960..2008).fake();
            // One in four learners keeps their profile private.
            let privacy = if idx % 4 == 3 {
                PRIVATE_VISIBILITY
            } else {
                ALL_USERS_VISIBILITY
            };

            UserSeed {
                user: User {
                    id,
                    email: format!("{username}@example.com"),
                    username,
                    password_hash: password_hash.to_string(),
                    is_staff: false,
                    is_superuser: false,
                    is_active: true,
                    date_joined: Utc::now() - Duration::days(days_ago),
                },
                profile: UserProfile {
                    user_id: id,
                    name: format!("{first_name} {last_name}"),
                    year_of_birth: Some(year_of_birth),
                },
                privacy,
            }
        })
        .collect()
}

pub async fn insert_users(
    store: &dyn CoursewareStore,
    seeds: &[UserSeed],
) -> Result<Vec<UserId>, AppError> {
    let mut ids = Vec::with_capacity(seeds.len());
    for seed in seeds {
        store.insert_user(&seed.user).await?;
        store.upsert_profile(&seed.profile).await?;
        store
            .set_preference(seed.user.id, ACCOUNT_PRIVACY_PREFERENCE, seed.privacy)
            .await?;
        ids.push(seed.user.id);
    }
    Ok(ids)
}
