//! Public API surface for the seismic monitoring core.
//!
//! This file consolidates the identifier newtypes and re-exports the domain
//! types consumers need. All types derive Serialize/Deserialize for JSON
//! serialization.

pub use crate::config::ClusterConfig;
pub use crate::config::CoreConfig;
pub use crate::config::EewConfig;
pub use crate::error::CoreError;
pub use crate::error::CoreResult;
pub use crate::models::EewAccuracy;
pub use crate::models::EewRecord;
pub use crate::models::EewSource;
pub use crate::models::EewTransition;
pub use crate::models::EewTransitionEvent;
pub use crate::models::EventLevel;
pub use crate::models::GeoCoordinate;
pub use crate::models::IntensityHistory;
pub use crate::models::IntensityStats;
pub use crate::models::Rgb;
pub use crate::models::ShakeEvent;
pub use crate::models::StationCatalogEntry;
pub use crate::models::StationPoint;
pub use crate::models::TravelTimeEntry;
pub use crate::models::TravelTimeTable;
pub use crate::services::EewReconciler;
pub use crate::services::MonitorCore;
pub use crate::services::MonitorSnapshot;
pub use crate::services::ShakeClusterEngine;
pub use crate::services::ShakeEventSnapshot;
pub use crate::services::StationSample;
pub use crate::services::StationSampleStore;
pub use crate::services::StationSnapshot;
pub use crate::services::WavefrontEstimator;
pub use crate::services::WavefrontReach;

use serde::{Deserialize, Serialize};

/// Monitored station identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StationId(pub i64);

/// Shake event identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ShakeEventId(pub i64);

impl StationId {
    pub fn new(value: i64) -> Self {
        StationId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl ShakeEventId {
    pub fn new(value: i64) -> Self {
        ShakeEventId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for ShakeEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<StationId> for i64 {
    fn from(id: StationId) -> Self {
        id.0
    }
}
impl From<ShakeEventId> for i64 {
    fn from(id: ShakeEventId) -> Self {
        id.0
    }
}
