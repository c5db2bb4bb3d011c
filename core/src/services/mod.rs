//! Service layer for the monitoring engines and their orchestration.
//!
//! This module contains the stateful engines of the core. The tick-driven
//! station/cluster path and the asynchronously written EEW path each sit
//! behind their own lock; [`monitor::MonitorCore`] composes them into one
//! facade for the surrounding application.

pub mod cluster;

pub mod eew_reconciler;

pub mod monitor;

pub mod sample_store;

pub mod wavefront;

pub use cluster::{ShakeClusterEngine, ShakeEventSnapshot};
pub use eew_reconciler::{EewObserver, EewReconciler};
pub use monitor::{MonitorCore, MonitorSnapshot};
pub use sample_store::{StationSample, StationSampleStore, StationSnapshot};
pub use wavefront::{WavefrontEstimator, WavefrontReach};
