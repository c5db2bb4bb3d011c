//! Shake event clustering over the station neighbor graph.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ShakeEventId, StationId};
use crate::config::ClusterConfig;
use crate::models::{EventLevel, Rgb, ShakeEvent};
use crate::services::sample_store::StationSampleStore;

/// Palette cycled through as events open, for map debugging overlays.
const DEBUG_COLORS: [Rgb; 8] = [
    Rgb::new(230, 57, 70),
    Rgb::new(244, 162, 97),
    Rgb::new(233, 196, 106),
    Rgb::new(42, 157, 143),
    Rgb::new(38, 70, 83),
    Rgb::new(69, 123, 157),
    Rgb::new(168, 218, 220),
    Rgb::new(181, 101, 167),
];

/// Rendering view of one open shake event, ordered members included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShakeEventSnapshot {
    pub id: ShakeEventId,
    pub created_at: DateTime<Utc>,
    pub level: EventLevel,
    pub member_ids: Vec<StationId>,
    pub debug_color: Rgb,
}

/// Creates, extends, merges and retires shake events from per-tick station
/// updates.
///
/// Stations move between two states, unlinked and linked to exactly one open
/// event; events stay open until their last member's linkage expires.
#[derive(Debug)]
pub struct ShakeClusterEngine {
    nearby_radius_km: f64,
    activation_diff_threshold: f64,
    events: HashMap<ShakeEventId, ShakeEvent>,
    next_id: i64,
    next_color: usize,
}

impl ShakeClusterEngine {
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            nearby_radius_km: config.nearby_radius_km,
            activation_diff_threshold: config.activation_diff_threshold,
            events: HashMap::new(),
            next_id: 1,
            next_color: 0,
        }
    }

    /// React to one station's fresh intensity sample.
    ///
    /// A station already linked to an open event refreshes that event: the
    /// event level rises to the sample's level if higher, and the station's
    /// expiry is pushed out. An unlinked station shaking above Weak joins
    /// the event of the first nearby station that is linked and itself still
    /// rising, or founds a new event when no such neighbor exists.
    pub fn on_station_updated(
        &mut self,
        store: &mut StationSampleStore,
        id: StationId,
        now: DateTime<Utc>,
    ) {
        let (level, linked, nearby) = match store.point(id) {
            Some(point) => (
                EventLevel::classify(point.latest_intensity().unwrap_or(0.0)),
                point.event_id,
                point.nearby_ids.clone(),
            ),
            None => return,
        };

        if let Some(event_id) = linked {
            if self.events.contains_key(&event_id) {
                self.refresh_linked(store, id, event_id, level, now);
                return;
            }
        }

        if level == EventLevel::Weak {
            return;
        }

        let joined = nearby.iter().find_map(|nid| {
            let neighbor = store.point(*nid)?;
            let event_id = neighbor.event_id?;
            if self.events.contains_key(&event_id)
                && neighbor.history.stats().diff >= self.activation_diff_threshold
            {
                Some(event_id)
            } else {
                None
            }
        });

        match joined {
            Some(event_id) => self.link_point(store, id, event_id, level, now),
            None => self.open_event(store, id, level, now),
        }
    }

    fn refresh_linked(
        &mut self,
        store: &mut StationSampleStore,
        id: StationId,
        event_id: ShakeEventId,
        level: EventLevel,
        now: DateTime<Utc>,
    ) {
        if let Some(event) = self.events.get_mut(&event_id) {
            event.raise_level(level);
        }
        if let Some(point) = store.point_mut(id) {
            extend_expiry(&mut point.evented_expire_at, level, now);
        }
    }

    fn link_point(
        &mut self,
        store: &mut StationSampleStore,
        id: StationId,
        event_id: ShakeEventId,
        level: EventLevel,
        now: DateTime<Utc>,
    ) {
        if let Some(event) = self.events.get_mut(&event_id) {
            event.add_member(id);
            event.raise_level(level);
        }
        if let Some(point) = store.point_mut(id) {
            point.event_id = Some(event_id);
            point.evented_at = Some(now);
            extend_expiry(&mut point.evented_expire_at, level, now);
        }
        log::info!("Cluster engine: station {} joined event {}", id, event_id);
    }

    fn open_event(
        &mut self,
        store: &mut StationSampleStore,
        id: StationId,
        level: EventLevel,
        now: DateTime<Utc>,
    ) {
        let event_id = self.allocate_event_id();
        let color = self.next_debug_color();
        self.events
            .insert(event_id, ShakeEvent::new(event_id, now, level, id, color));

        if let Some(point) = store.point_mut(id) {
            point.event_id = Some(event_id);
            point.evented_at = Some(now);
            point.evented_expire_at = Some(now + Duration::seconds(level.expiry_seconds()));
        }
        log::info!(
            "Cluster engine: opened event {} at level {} (station {})",
            event_id,
            level,
            id
        );
    }

    fn allocate_event_id(&mut self) -> ShakeEventId {
        let id = ShakeEventId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn next_debug_color(&mut self) -> Rgb {
        let color = DEBUG_COLORS[self.next_color % DEBUG_COLORS.len()];
        self.next_color += 1;
        color
    }

    /// Unlink every member whose expiry has lapsed and retire events left
    /// with no members. Returns the number of retired events.
    pub fn sweep(&mut self, store: &mut StationSampleStore, now: DateTime<Utc>) -> usize {
        let mut lapsed: Vec<(ShakeEventId, StationId)> = Vec::new();
        for (event_id, event) in &self.events {
            for member in &event.member_ids {
                let expired = store
                    .point(*member)
                    .and_then(|p| p.evented_expire_at)
                    .map_or(true, |t| t < now);
                if expired {
                    lapsed.push((*event_id, *member));
                }
            }
        }

        for (event_id, member) in lapsed {
            if let Some(point) = store.point_mut(member) {
                point.event_id = None;
                point.evented_at = None;
                point.evented_expire_at = None;
            }
            if let Some(event) = self.events.get_mut(&event_id) {
                event.remove_member(member);
            }
        }

        let mut retired = 0;
        self.events.retain(|id, event| {
            if event.is_empty() {
                log::info!("Cluster engine: retired event {}", id);
                retired += 1;
                false
            } else {
                true
            }
        });
        retired
    }

    /// Merge every pair of open events whose member sets touch within the
    /// nearby radius. Returns the number of merges performed.
    pub fn merge_pass(&mut self, store: &mut StationSampleStore) -> usize {
        let mut ids: Vec<ShakeEventId> = self.events.keys().copied().collect();
        ids.sort_unstable();

        let mut merged = 0;
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                if self.try_merge(store, ids[i], ids[j]) {
                    merged += 1;
                }
            }
        }
        merged
    }

    /// Absorb `absorbed` into `survivor` if any member pair sits within the
    /// nearby radius.
    pub fn try_merge(
        &mut self,
        store: &mut StationSampleStore,
        survivor: ShakeEventId,
        absorbed: ShakeEventId,
    ) -> bool {
        if survivor == absorbed || !self.check_nearby(store, survivor, absorbed) {
            return false;
        }
        let Some(other) = self.events.remove(&absorbed) else {
            return false;
        };

        for member in &other.member_ids {
            if let Some(point) = store.point_mut(*member) {
                point.event_id = Some(survivor);
            }
        }
        match self.events.get_mut(&survivor) {
            Some(event) => {
                event.absorb(other);
                log::info!("Cluster engine: merged event {} into {}", absorbed, survivor);
                true
            }
            None => false,
        }
    }

    /// Whether any member pair of the two events sits within the nearby
    /// radius. Symmetric in its arguments.
    pub fn check_nearby(
        &self,
        store: &StationSampleStore,
        a: ShakeEventId,
        b: ShakeEventId,
    ) -> bool {
        let (Some(ea), Some(eb)) = (self.events.get(&a), self.events.get(&b)) else {
            return false;
        };

        for p in &ea.member_ids {
            let Some(point_p) = store.point(*p) else {
                continue;
            };
            for q in &eb.member_ids {
                let Some(point_q) = store.point(*q) else {
                    continue;
                };
                if point_p.location.distance_km(&point_q.location) <= self.nearby_radius_km {
                    return true;
                }
            }
        }
        false
    }

    /// Explicitly unlink a station, retiring its event if it empties.
    /// Used when a station's upstream data becomes invalid.
    pub fn remove_point(&mut self, store: &mut StationSampleStore, id: StationId) {
        let event_id = match store.point_mut(id) {
            Some(point) => {
                let event_id = point.event_id.take();
                point.evented_at = None;
                point.evented_expire_at = None;
                event_id
            }
            None => None,
        };
        let Some(event_id) = event_id else { return };

        let retire = match self.events.get_mut(&event_id) {
            Some(event) => {
                event.remove_member(id);
                event.is_empty()
            }
            None => false,
        };
        if retire {
            self.events.remove(&event_id);
            log::info!("Cluster engine: retired event {}", event_id);
        }
    }

    pub fn event(&self, id: ShakeEventId) -> Option<&ShakeEvent> {
        self.events.get(&id)
    }

    pub fn open_event_count(&self) -> usize {
        self.events.len()
    }

    /// Open events ordered by id, for rendering.
    pub fn snapshots(&self) -> Vec<ShakeEventSnapshot> {
        let mut snapshots: Vec<ShakeEventSnapshot> = self
            .events
            .values()
            .map(|event| ShakeEventSnapshot {
                id: event.id,
                created_at: event.created_at,
                level: event.level(),
                member_ids: event.member_ids.iter().copied().collect(),
                debug_color: event.debug_color,
            })
            .collect();
        snapshots.sort_by_key(|s| s.id);
        snapshots
    }
}

/// Push an expiry out to `now + expiry(level)`, never pulling it back in.
fn extend_expiry(slot: &mut Option<DateTime<Utc>>, level: EventLevel, now: DateTime<Utc>) {
    let candidate = now + Duration::seconds(level.expiry_seconds());
    *slot = Some(match *slot {
        Some(current) if current > candidate => current,
        _ => candidate,
    });
}
