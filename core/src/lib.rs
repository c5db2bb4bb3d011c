//! # Shindo Core
//!
//! Real-time seismic monitoring core.
//!
//! This crate maintains a live picture of ground shaking from a stream of
//! per-station realtime intensity samples and a stream of Earthquake Early
//! Warning (EEW) reports. It clusters shaking stations into geographic shake
//! events, reconciles EEW reports arriving from several sources into a single
//! authoritative record per earthquake, and estimates how far the P and S
//! wavefronts of an ongoing earthquake have travelled.
//!
//! ## Features
//!
//! - **Sample history**: Fixed-depth per-station intensity ring buffers with
//!   trend and average statistics
//! - **Shake clustering**: Groups nearby shaking stations into shake events
//!   with severity-dependent lifetimes
//! - **EEW reconciliation**: Keeps the best report per earthquake across
//!   sources, emitting transition events for downstream consumers
//! - **Wavefront estimation**: P/S travel-time interpolation against a
//!   packaged travel-time table
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier newtypes and the public type surface
//! - [`models`]: Domain types for stations, shake events, EEW reports and
//!   travel times
//! - [`parsing`]: Parsers for packaged static resources
//! - [`services`]: The monitoring engines and the tick-driven core

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod parsing;
pub mod services;
