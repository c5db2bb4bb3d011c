//! Parsers for packaged static resources.
//!
//! The monitoring core itself consumes already-materialized values; the only
//! format it understands is the packaged travel-time table, loaded once at
//! startup.
//!
//! # Parsers
//!
//! - [`travel_time`]: Parse the whitespace-separated travel-time table

pub mod travel_time;

pub use travel_time::{parse_travel_time_file, parse_travel_time_str};
