//! # OpenLMS CLI
//!
//! Administrative tools for OpenLMS: user and token management, enrollment
//! changes and development seeding.
//!
//! ## Usage
//!
//! ```ignore
//! use openlms_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(50, 5);
//! seed_all(&store, config).await?;
//! ```

pub mod commands;
pub mod seeder;
