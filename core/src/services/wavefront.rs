//! P/S wavefront reach estimation from the travel-time table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{EewRecord, TravelTimeEntry, TravelTimeTable};

/// How far the P and S wavefronts have travelled, in kilometres.
///
/// A `None` distance means the reach cannot be stated: the wavefront has not
/// arrived at the nearest table entry yet, has passed the farthest one, or
/// the depth bucket is absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavefrontReach {
    pub p_distance_km: Option<f64>,
    pub s_distance_km: Option<f64>,
}

impl WavefrontReach {
    pub const NONE: WavefrontReach = WavefrontReach {
        p_distance_km: None,
        s_distance_km: None,
    };
}

/// Pure, stateless wavefront distance query over a loaded travel-time table.
#[derive(Debug, Clone)]
pub struct WavefrontEstimator {
    table: TravelTimeTable,
}

impl WavefrontEstimator {
    pub fn new(table: TravelTimeTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TravelTimeTable {
        &self.table
    }

    /// Estimate the P/S wavefront distances for an earthquake at `depth_km`
    /// that originated at `origin_time`.
    ///
    /// Depth is matched against the table exactly; there is no interpolation
    /// across depth buckets. Within a bucket, distance is linearly
    /// interpolated between the two entries whose arrival times bracket the
    /// elapsed time.
    pub fn estimate(
        &self,
        origin_time: DateTime<Utc>,
        now: DateTime<Utc>,
        depth_km: i32,
    ) -> WavefrontReach {
        let elapsed_ms = (now - origin_time).num_milliseconds();
        if elapsed_ms <= 0 {
            return WavefrontReach::NONE;
        }
        let Some(bucket) = self.table.bucket(depth_km) else {
            return WavefrontReach::NONE;
        };

        WavefrontReach {
            p_distance_km: interpolate(bucket, elapsed_ms, |e| e.p_arrival_ms),
            s_distance_km: interpolate(bucket, elapsed_ms, |e| e.s_arrival_ms),
        }
    }

    /// Estimate the wavefront reach for an EEW record. The record must carry
    /// both an origin time and a depth for the query to be answerable.
    pub fn estimate_for_record(&self, record: &EewRecord, now: DateTime<Utc>) -> WavefrontReach {
        match (record.origin_time, record.depth_km) {
            (Some(origin), Some(depth)) => self.estimate(origin, now, depth),
            _ => WavefrontReach::NONE,
        }
    }
}

/// Distance reached after `elapsed_ms`, against one arrival-time column of a
/// depth bucket sorted by ascending distance.
fn interpolate(
    bucket: &[TravelTimeEntry],
    elapsed_ms: i64,
    arrival: impl Fn(&TravelTimeEntry) -> i64,
) -> Option<f64> {
    let pos = bucket.iter().position(|e| arrival(e) > elapsed_ms)?;
    if pos == 0 {
        return None;
    }

    let prev = &bucket[pos - 1];
    let cur = &bucket[pos];
    let span = (arrival(cur) - arrival(prev)) as f64;
    if span <= 0.0 {
        return Some(prev.distance_km);
    }

    let fraction = (elapsed_ms - arrival(prev)) as f64 / span;
    Some(prev.distance_km + fraction * (cur.distance_km - prev.distance_km))
}
