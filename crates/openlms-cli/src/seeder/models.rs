//! Seeding configuration.

/// How much fake data to generate.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub num_users: usize,
    pub num_courses: usize,
    /// Courses each learner is enrolled in, capped at `num_courses`.
    pub enrollments_per_user: usize,
    /// Password shared by every seeded user.
    pub password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            num_users: 20,
            num_courses: 5,
            enrollments_per_user: 3,
            password: "password".to_string(),
        }
    }
}

impl SeedConfig {
    pub fn new(num_users: usize, num_courses: usize) -> Self {
        Self {
            num_users,
            num_courses,
            ..Default::default()
        }
    }

    pub fn with_enrollments_per_user(mut self, enrollments_per_user: usize) -> Self {
        self.enrollments_per_user = enrollments_per_user;
        self
    }
}

/// What a seeding run created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub courses: usize,
    pub enrollments: usize,
    pub certificates: usize,
}
