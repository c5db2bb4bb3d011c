//! The tick-driven monitoring facade.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::api::StationId;
use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::models::{EewRecord, EewSource, EewTransitionEvent, StationCatalogEntry, TravelTimeTable};
use crate::services::cluster::{ShakeClusterEngine, ShakeEventSnapshot};
use crate::services::eew_reconciler::EewReconciler;
use crate::services::sample_store::{StationSample, StationSampleStore, StationSnapshot};
use crate::services::wavefront::{WavefrontEstimator, WavefrontReach};

/// Everything the renderer needs from the station/cluster path, taken under
/// one read of the tick state.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub stations: Vec<StationSnapshot>,
    pub events: Vec<ShakeEventSnapshot>,
}

/// The station store and cluster engine share one lock: clustering reads and
/// writes station link state on every tick.
struct TickState {
    store: StationSampleStore,
    cluster: ShakeClusterEngine,
}

/// Composes the monitoring engines behind a single construction point.
///
/// The external tick driver calls [`MonitorCore::on_tick`] at a fixed
/// cadence; source watchers call [`MonitorCore::submit_eew`] whenever their
/// feeds produce something. Rendering reads never block either path for
/// longer than a snapshot copy.
pub struct MonitorCore {
    state: RwLock<TickState>,
    eew: EewReconciler,
    wavefront: WavefrontEstimator,
}

impl MonitorCore {
    pub fn new(
        config: &CoreConfig,
        catalog: Vec<StationCatalogEntry>,
        travel_time: TravelTimeTable,
    ) -> Result<Self, CoreError> {
        let store = StationSampleStore::from_catalog(catalog, config.cluster.nearby_radius_km)?;
        let cluster = ShakeClusterEngine::new(&config.cluster);

        Ok(Self {
            state: RwLock::new(TickState { store, cluster }),
            eew: EewReconciler::new(config.eew.clone()),
            wavefront: WavefrontEstimator::new(travel_time),
        })
    }

    /// Process one tick of station samples.
    ///
    /// Pushes every sample, lets the cluster engine react to the stations
    /// that actually reported an intensity, merges touching events, and
    /// sweeps lapsed linkage and stale EEW records.
    pub fn on_tick(&self, samples: &[StationSample], now: DateTime<Utc>) {
        {
            let mut state = self.state.write();
            let TickState { store, cluster } = &mut *state;

            for sample in samples {
                if store.push_sample(sample) && sample.intensity.is_some() {
                    cluster.on_station_updated(store, sample.id, now);
                }
            }
            cluster.merge_pass(store);
            cluster.sweep(store, now);
        }
        self.eew.sweep(now);
    }

    /// Forward one source watcher poll result to the EEW reconciler.
    pub fn submit_eew(
        &self,
        record: Option<EewRecord>,
        updated_time: DateTime<Utc>,
        source: EewSource,
    ) -> Vec<EewTransitionEvent> {
        self.eew.submit(record, updated_time, source)
    }

    /// Register a notification hook for EEW transitions.
    pub fn subscribe_eew<F>(&self, observer: F)
    where
        F: Fn(&EewTransitionEvent) + Send + Sync + 'static,
    {
        self.eew.subscribe(observer);
    }

    /// A clonable handle to the reconciler for source watchers.
    pub fn eew(&self) -> EewReconciler {
        self.eew.clone()
    }

    /// The latest published EEW snapshot, ordered by record id.
    pub fn eew_snapshot(&self) -> Arc<Vec<EewRecord>> {
        self.eew.snapshot()
    }

    /// Station and event state for rendering, consistent within one tick.
    pub fn snapshot(&self) -> MonitorSnapshot {
        let state = self.state.read();
        MonitorSnapshot {
            stations: state.store.snapshots(),
            events: state.cluster.snapshots(),
        }
    }

    /// Estimate P/S wavefront reach for an ongoing earthquake.
    pub fn estimate_wavefront(
        &self,
        origin_time: DateTime<Utc>,
        now: DateTime<Utc>,
        depth_km: i32,
    ) -> WavefrontReach {
        self.wavefront.estimate(origin_time, now, depth_km)
    }

    /// Estimate wavefront reach for a reconciled EEW record.
    pub fn wavefront_for(&self, record: &EewRecord, now: DateTime<Utc>) -> WavefrontReach {
        self.wavefront.estimate_for_record(record, now)
    }

    pub fn wavefront(&self) -> &WavefrontEstimator {
        &self.wavefront
    }

    /// Unlink a station whose upstream data became invalid.
    pub fn remove_station(&self, id: StationId) {
        let mut state = self.state.write();
        let TickState { store, cluster } = &mut *state;
        cluster.remove_point(store, id);
    }

    /// Clear all station histories after an upstream network restart.
    pub fn reset_histories(&self) {
        self.state.write().store.reset_all_histories();
    }
}
