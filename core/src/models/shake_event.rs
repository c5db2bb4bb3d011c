//! Shake events: clusters of geographically correlated shaking stations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::api::{ShakeEventId, StationId};
use crate::models::intensity::{EventLevel, Rgb};

/// An open cluster of shaking stations.
///
/// The severity level only ever rises while the event is open; members come
/// and go as their linkage expires or is refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShakeEvent {
    pub id: ShakeEventId,
    pub created_at: DateTime<Utc>,
    level: EventLevel,
    pub member_ids: BTreeSet<StationId>,
    /// Palette color assigned at creation, for map debugging overlays.
    pub debug_color: Rgb,
}

impl ShakeEvent {
    pub fn new(
        id: ShakeEventId,
        created_at: DateTime<Utc>,
        level: EventLevel,
        founding_member: StationId,
        debug_color: Rgb,
    ) -> Self {
        let mut member_ids = BTreeSet::new();
        member_ids.insert(founding_member);
        Self {
            id,
            created_at,
            level,
            member_ids,
            debug_color,
        }
    }

    pub fn level(&self) -> EventLevel {
        self.level
    }

    /// Raise the severity level. Lower levels are ignored.
    pub fn raise_level(&mut self, level: EventLevel) {
        self.level = self.level.max(level);
    }

    pub fn add_member(&mut self, id: StationId) {
        self.member_ids.insert(id);
    }

    pub fn remove_member(&mut self, id: StationId) {
        self.member_ids.remove(&id);
    }

    pub fn member_count(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }

    /// Absorb another event: union of members, higher of the two levels.
    pub fn absorb(&mut self, other: ShakeEvent) {
        self.raise_level(other.level);
        self.member_ids.extend(other.member_ids);
    }
}
