//! Courseware access rules.

pub mod controller;
pub mod model;
pub mod router;
pub mod rules;

pub use router::init_courseware_router;
pub use rules::{Rule, RuleContext, RuleRegistry};
