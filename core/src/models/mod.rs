//! Domain models for the seismic monitoring core.
//!
//! This module contains the data structures shared across the monitoring
//! services: geographic coordinates, intensity classification, station state,
//! shake events, EEW records and travel-time tables.

pub mod eew;
pub mod geo;
pub mod intensity;
pub mod shake_event;
pub mod station;
pub mod travel_time;

pub use eew::*;
pub use geo::*;
pub use intensity::*;
pub use shake_event::*;
pub use station::*;
pub use travel_time::*;
