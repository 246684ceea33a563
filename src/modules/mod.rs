pub mod accounts;
pub mod auth;
pub mod certificates;
pub mod courseware;
pub mod enrollments;
pub mod track;

pub use self::certificates::{CertificateListItem, CertificateResponse};
pub use self::courseware::RuleRegistry;
