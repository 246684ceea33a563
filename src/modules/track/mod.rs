//! Browser and Segment event tracking.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
pub mod tracker;

pub use router::init_track_router;
pub use tracker::{LoggingTracker, MemoryTracker, Tracker, TrackingEvent};
