//! Station sample intake and the precomputed neighbor graph.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::{ShakeEventId, StationId};
use crate::error::CoreError;
use crate::models::{GeoCoordinate, IntensityStats, Rgb, StationCatalogEntry, StationPoint};

/// One tick's reading for one station, as handed over by the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationSample {
    pub id: StationId,
    pub intensity: Option<f64>,
    pub color: Option<Rgb>,
}

impl StationSample {
    pub fn new(id: StationId, intensity: Option<f64>, color: Option<Rgb>) -> Self {
        Self {
            id,
            intensity,
            color,
        }
    }
}

/// Per-station derived state, published for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSnapshot {
    pub id: StationId,
    pub name: String,
    pub latest_intensity: Option<f64>,
    pub diff: f64,
    pub average: f64,
    pub has_valid_history: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<ShakeEventId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

/// Owns the live state of every monitored station.
///
/// Stations are loaded once from a catalog; the pairwise neighbor graph is
/// precomputed at load and never changes afterwards.
#[derive(Debug)]
pub struct StationSampleStore {
    points: HashMap<StationId, StationPoint>,
}

impl StationSampleStore {
    /// Build the store from a station catalog and precompute each station's
    /// nearby list from pairwise geographic distance.
    pub fn from_catalog(
        catalog: Vec<StationCatalogEntry>,
        nearby_radius_km: f64,
    ) -> Result<Self, CoreError> {
        let mut points: HashMap<StationId, StationPoint> = HashMap::with_capacity(catalog.len());
        for entry in catalog {
            if points.contains_key(&entry.id) {
                return Err(CoreError::DuplicateStation(entry.id));
            }
            points.insert(
                entry.id,
                StationPoint::new(entry.id, entry.name, entry.location),
            );
        }

        let mut store = Self { points };
        let link_count = store.build_neighbor_graph(nearby_radius_km);
        log::info!(
            "Sample store: loaded {} stations ({} neighbor links within {} km)",
            store.points.len(),
            link_count,
            nearby_radius_km
        );
        Ok(store)
    }

    fn build_neighbor_graph(&mut self, nearby_radius_km: f64) -> usize {
        let mut located: Vec<(StationId, GeoCoordinate)> =
            self.points.values().map(|p| (p.id, p.location)).collect();
        located.sort_by_key(|(id, _)| *id);

        let mut nearby: HashMap<StationId, Vec<StationId>> = HashMap::new();
        let mut link_count = 0;
        for i in 0..located.len() {
            for j in (i + 1)..located.len() {
                let (a, loc_a) = located[i];
                let (b, loc_b) = located[j];
                if loc_a.distance_km(&loc_b) <= nearby_radius_km {
                    nearby.entry(a).or_default().push(b);
                    nearby.entry(b).or_default().push(a);
                    link_count += 1;
                }
            }
        }

        for (id, mut ids) in nearby {
            ids.sort_unstable();
            if let Some(point) = self.points.get_mut(&id) {
                point.nearby_ids = ids;
            }
        }
        link_count
    }

    /// Push one sample into its station's history.
    ///
    /// Samples for stations missing from the catalog are dropped. Returns
    /// whether the station was known.
    pub fn push_sample(&mut self, sample: &StationSample) -> bool {
        match self.points.get_mut(&sample.id) {
            Some(point) => {
                point.apply_sample(sample.intensity, sample.color);
                true
            }
            None => {
                log::debug!("Sample store: dropping sample for unknown station {}", sample.id);
                false
            }
        }
    }

    /// Clear one station's history, keeping its identity and neighbor list.
    pub fn reset_history(&mut self, id: StationId) {
        if let Some(point) = self.points.get_mut(&id) {
            point.reset_history();
        }
    }

    /// Clear every station's history. Used when the upstream observation
    /// network restarts and old values would be misleading.
    pub fn reset_all_histories(&mut self) {
        for point in self.points.values_mut() {
            point.reset_history();
        }
        log::info!("Sample store: reset all station histories");
    }

    pub fn point(&self, id: StationId) -> Option<&StationPoint> {
        self.points.get(&id)
    }

    pub fn point_mut(&mut self, id: StationId) -> Option<&mut StationPoint> {
        self.points.get_mut(&id)
    }

    pub fn stats(&self, id: StationId) -> Option<IntensityStats> {
        self.points.get(&id).map(|p| p.history.stats())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationPoint> {
        self.points.values()
    }

    /// Per-station derived state, ordered by station id.
    pub fn snapshots(&self) -> Vec<StationSnapshot> {
        let mut snapshots: Vec<StationSnapshot> = self
            .points
            .values()
            .map(|point| {
                let stats = point.history.stats();
                StationSnapshot {
                    id: point.id,
                    name: point.name.clone(),
                    latest_intensity: point.latest_intensity(),
                    diff: stats.diff,
                    average: stats.average,
                    has_valid_history: point.has_valid_history,
                    event_id: point.event_id,
                    color: point.color,
                }
            })
            .collect();
        snapshots.sort_by_key(|s| s.id);
        snapshots
    }
}
