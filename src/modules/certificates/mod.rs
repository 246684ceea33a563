//! Course certificates API.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{CertificateListItem, CertificateResponse};
pub use router::init_certificates_router;
