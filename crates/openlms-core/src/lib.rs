//! # OpenLMS Core
//!
//! Core types, errors, and utilities for the OpenLMS API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: Password hashing and verification
//! - [`permissions`]: OAuth scope, JWT filter and permission name constants
//! - [`serde`]: Custom serde helpers for query parameters
//!
//! # Example
//!
//! ```ignore
//! use axum::http::StatusCode;
//! use openlms_core::errors::AppError;
//!
//! let error = AppError::with_code(StatusCode::NOT_FOUND, "course_id_not_valid");
//! ```

pub mod errors;
pub mod password;
pub mod permissions;
pub mod serde;

pub use errors::AppError;
pub use password::{hash_password, verify_password};
