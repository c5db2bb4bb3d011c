//! Per-station state: the fixed-depth intensity history and the live point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ShakeEventId, StationId};
use crate::models::geo::GeoCoordinate;
use crate::models::intensity::Rgb;

/// Depth of the per-station intensity ring buffer.
pub const HISTORY_LEN: usize = 10;

/// Trend and average derived from one walk over an intensity history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityStats {
    /// Signed short-term trend. Positive while intensity is rising.
    pub diff: f64,
    /// Sum of the non-null samples divided by the fixed buffer depth.
    /// Missing samples depress the average instead of being excluded.
    pub average: f64,
}

/// Fixed-capacity circular buffer of optional intensity samples.
///
/// The write cursor always points at the newest sample. Slots that have not
/// been written yet, and ticks where the upstream feed had no reading, hold
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityHistory {
    samples: [Option<f64>; HISTORY_LEN],
    cursor: usize,
}

impl IntensityHistory {
    pub fn new() -> Self {
        Self {
            samples: [None; HISTORY_LEN],
            cursor: 0,
        }
    }

    /// Advance the write cursor (wrapping) and store a new sample,
    /// overwriting the oldest slot.
    pub fn push(&mut self, value: Option<f64>) {
        self.cursor = (self.cursor + 1) % HISTORY_LEN;
        self.samples[self.cursor] = value;
    }

    /// The newest sample.
    pub fn latest(&self) -> Option<f64> {
        self.samples[self.cursor]
    }

    pub fn samples(&self) -> &[Option<f64>; HISTORY_LEN] {
        &self.samples
    }

    /// Recompute `diff` and `average` in a single walk starting at the
    /// cursor and wrapping once around the buffer.
    ///
    /// `diff` accumulates `previous - current` across consecutive non-null
    /// entries; null entries are skipped but do not reset the running
    /// previous value across the gap. `average` divides the sum of non-null
    /// entries by the fixed buffer depth, never by the non-null count.
    pub fn stats(&self) -> IntensityStats {
        let mut diff = 0.0;
        let mut sum = 0.0;
        let mut prev: Option<f64> = None;

        for offset in 0..HISTORY_LEN {
            let idx = (self.cursor + offset) % HISTORY_LEN;
            if let Some(value) = self.samples[idx] {
                sum += value;
                if let Some(p) = prev {
                    diff += p - value;
                }
                prev = Some(value);
            }
        }

        IntensityStats {
            diff,
            average: sum / HISTORY_LEN as f64,
        }
    }

    /// Clear every slot and reset the cursor. Used when the upstream
    /// observation network restarts and old values would be misleading.
    pub fn clear(&mut self) {
        self.samples = [None; HISTORY_LEN];
        self.cursor = 0;
    }
}

impl Default for IntensityHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Static catalog entry describing one monitored station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationCatalogEntry {
    pub id: StationId,
    pub name: String,
    pub location: GeoCoordinate,
}

impl StationCatalogEntry {
    pub fn new(id: StationId, name: impl Into<String>, location: GeoCoordinate) -> Self {
        Self {
            id,
            name: name.into(),
            location,
        }
    }
}

/// Live state of one monitored station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationPoint {
    pub id: StationId,
    pub name: String,
    pub location: GeoCoordinate,
    pub history: IntensityHistory,
    /// Color of the latest sample, as observed on the upstream intensity map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    /// True once a color and an intensity value have arrived together at
    /// least once. Sticky until [`StationPoint::reset_history`].
    pub has_valid_history: bool,
    /// The open shake event this station currently belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<ShakeEventId>,
    /// When the station was linked to its current event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evented_at: Option<DateTime<Utc>>,
    /// When the station's event membership lapses unless refreshed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evented_expire_at: Option<DateTime<Utc>>,
    /// Stations within the nearby radius. Built once at load, never mutated.
    pub nearby_ids: Vec<StationId>,
}

impl StationPoint {
    pub fn new(id: StationId, name: impl Into<String>, location: GeoCoordinate) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            history: IntensityHistory::new(),
            color: None,
            has_valid_history: false,
            event_id: None,
            evented_at: None,
            evented_expire_at: None,
            nearby_ids: Vec::new(),
        }
    }

    /// Push one tick's sample into the history and refresh the latest color.
    pub fn apply_sample(&mut self, intensity: Option<f64>, color: Option<Rgb>) {
        self.history.push(intensity);
        if let Some(c) = color {
            self.color = Some(c);
        }
        if intensity.is_some() && color.is_some() {
            self.has_valid_history = true;
        }
    }

    /// Drop all history, including the valid-history flag.
    pub fn reset_history(&mut self) {
        self.history.clear();
        self.has_valid_history = false;
    }

    pub fn latest_intensity(&self) -> Option<f64> {
        self.history.latest()
    }

    pub fn is_linked(&self) -> bool {
        self.event_id.is_some()
    }
}
