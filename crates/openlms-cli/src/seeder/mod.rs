//! Fills a store with fake learners, courses, enrollments and certificates
//! for local development.

mod courses;
mod models;
mod users;

use std::time::Instant;

use openlms::store::CoursewareStore;
use openlms_core::{AppError, hash_password};

pub use courses::{enroll_and_certify, generate_courses, insert_courses};
pub use models::{SeedConfig, SeedSummary};
pub use users::{UserSeed, generate_users, insert_users};

pub async fn seed_all(
    store: &dyn CoursewareStore,
    config: SeedConfig,
) -> Result<SeedSummary, AppError> {
    let start_time = Instant::now();
    println!(
        "🌱 Seeding {} users across {} courses...",
        config.num_users, config.num_courses
    );

    // bcrypt is slow; every seeded user shares one hash.
    let password_hash = hash_password(&config.password)?;

    let courses = generate_courses(config.num_courses)?;
    insert_courses(store, &courses).await?;
    println!("   ✓ Inserted {} course overviews", courses.len());

    let seeds = generate_users(config.num_users, &password_hash);
    let user_ids = insert_users(store, &seeds).await?;
    println!("   ✓ Inserted {} users with profiles", user_ids.len());

    let (enrollments, certificates) =
        enroll_and_certify(store, &user_ids, &courses, config.enrollments_per_user).await?;
    println!(
        "   ✓ Created {} enrollments and {} certificates",
        enrollments, certificates
    );

    println!("✅ Seeding finished in {:?}", start_time.elapsed());

    Ok(SeedSummary {
        users: user_ids.len(),
        courses: courses.len(),
        enrollments,
        certificates,
    })
}
