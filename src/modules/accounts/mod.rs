//! Account privacy and profile field visibility.

pub mod service;

pub use service::AccountService;
