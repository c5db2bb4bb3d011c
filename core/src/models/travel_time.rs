//! Seismic travel-time table, loaded once from a packaged resource.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CoreError;

/// One row of the travel-time table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelTimeEntry {
    /// Hypocenter depth bucket in kilometres.
    pub depth_km: i32,
    /// Epicentral distance in kilometres.
    pub distance_km: f64,
    /// Expected P-wave arrival after origin, in milliseconds.
    pub p_arrival_ms: i64,
    /// Expected S-wave arrival after origin, in milliseconds.
    pub s_arrival_ms: i64,
}

/// Travel-time entries grouped by depth bucket, ordered by ascending
/// distance within each bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelTimeTable {
    buckets: HashMap<i32, Vec<TravelTimeEntry>>,
    entry_count: usize,
}

impl TravelTimeTable {
    /// Group entries by depth and order each bucket by distance.
    ///
    /// An empty entry list is the one fatal load-time condition and is
    /// rejected here rather than silently producing a table that can never
    /// answer a query.
    pub fn from_entries(entries: Vec<TravelTimeEntry>) -> Result<Self, CoreError> {
        if entries.is_empty() {
            return Err(CoreError::EmptyTravelTimeTable);
        }

        let entry_count = entries.len();
        let mut buckets: HashMap<i32, Vec<TravelTimeEntry>> = HashMap::new();
        for entry in entries {
            buckets.entry(entry.depth_km).or_default().push(entry);
        }
        for bucket in buckets.values_mut() {
            bucket.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        }

        Ok(Self {
            buckets,
            entry_count,
        })
    }

    /// Entries for an exact depth bucket, ascending by distance.
    pub fn bucket(&self, depth_km: i32) -> Option<&[TravelTimeEntry]> {
        self.buckets.get(&depth_km).map(|v| v.as_slice())
    }

    /// All depth buckets present in the table, ascending.
    pub fn depths(&self) -> Vec<i32> {
        let mut depths: Vec<i32> = self.buckets.keys().copied().collect();
        depths.sort_unstable();
        depths
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}
