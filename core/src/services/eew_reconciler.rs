//! Reconciliation of EEW reports arriving from multiple sources.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::config::EewConfig;
use crate::models::{EewRecord, EewSource, EewTransition, EewTransitionEvent};

/// Callback invoked after each cache mutation that warrants notification.
///
/// Observers run outside the reconciler's critical section and must not
/// block for long; sound and UI side effects belong to the subscriber.
pub type EewObserver = Arc<dyn Fn(&EewTransitionEvent) + Send + Sync>;

struct Inner {
    config: EewConfig,
    records: HashMap<String, EewRecord>,
    snapshot: Arc<Vec<EewRecord>>,
}

/// Single authoritative cache of active EEW reports.
///
/// Source watchers run on their own cadences and submit concurrently; all
/// mutation happens under one lock, and readers only ever see immutable
/// published snapshots.
#[derive(Clone)]
pub struct EewReconciler {
    inner: Arc<RwLock<Inner>>,
    observers: Arc<RwLock<Vec<EewObserver>>>,
}

impl EewReconciler {
    pub fn new(config: EewConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                config,
                records: HashMap::new(),
                snapshot: Arc::new(Vec::new()),
            })),
            observers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a notification hook for cache transitions.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&EewTransitionEvent) + Send + Sync + 'static,
    {
        self.observers.write().push(Arc::new(observer));
    }

    /// Submit one poll result from a source watcher.
    ///
    /// `record` is `None` (or carries an empty id) when this poll cycle
    /// found nothing. `updated_time` is the poll's own clock and doubles as
    /// "now" for the staleness sweep that always runs first.
    ///
    /// Returns the transitions this submission caused, after notifying
    /// subscribed observers of each.
    pub fn submit(
        &self,
        record: Option<EewRecord>,
        updated_time: DateTime<Utc>,
        source: EewSource,
    ) -> Vec<EewTransitionEvent> {
        let record = record.filter(|r| !r.id.is_empty());

        let events = {
            let mut inner = self.inner.write();
            let mut mutated = inner.sweep_locked(updated_time) > 0;
            let mut events = Vec::new();

            match record {
                None => {
                    if source.is_continuous() {
                        mutated |= inner.cancel_absent_locked(source, updated_time, &mut events);
                    }
                }
                Some(record) => {
                    inner.replace_locked(record, updated_time, &mut events);
                    mutated = true;
                }
            }

            if mutated {
                inner.publish_locked();
            }
            events
        };

        if !events.is_empty() {
            let observers = self.observers.read().clone();
            for event in &events {
                for observer in &observers {
                    observer(event);
                }
            }
        }
        events
    }

    /// Drop records that have gone silent past their staleness window.
    /// Returns the number of records dropped.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut inner = self.inner.write();
        let dropped = inner.sweep_locked(now);
        if dropped > 0 {
            inner.publish_locked();
        }
        dropped
    }

    /// The latest published snapshot, ordered by record id.
    pub fn snapshot(&self) -> Arc<Vec<EewRecord>> {
        Arc::clone(&self.inner.read().snapshot)
    }

    pub fn record(&self, id: &str) -> Option<EewRecord> {
        self.inner.read().records.get(id).cloned()
    }

    pub fn active_count(&self) -> usize {
        self.inner.read().records.len()
    }
}

impl Inner {
    fn sweep_locked(&mut self, now: DateTime<Utc>) -> usize {
        let general = Duration::seconds(self.config.stale_after_secs);
        let continuous = Duration::seconds(
            self.config
                .continuous_stale_offset_secs
                .min(self.config.stale_after_secs),
        );

        let before = self.records.len();
        self.records.retain(|id, record| {
            let window = if record.source.is_continuous() {
                continuous
            } else {
                general
            };
            let keep = now - record.updated_time < window;
            if !keep {
                log::info!(
                    "Eew reconciler: dropped stale record {} from {}",
                    id,
                    record.source
                );
            }
            keep
        });
        before - self.records.len()
    }

    /// A continuous source reported nothing this cycle: every open report it
    /// previously produced is implicitly cancelled.
    fn cancel_absent_locked(
        &mut self,
        source: EewSource,
        updated_time: DateTime<Utc>,
        events: &mut Vec<EewTransitionEvent>,
    ) -> bool {
        let mut mutated = false;
        for record in self.records.values_mut() {
            if record.source == source
                && !record.is_final
                && !record.is_cancelled
                && record.updated_time < updated_time
            {
                record.is_cancelled = true;
                record.updated_time = updated_time;
                log::info!(
                    "Eew reconciler: cancelled record {} on silence from {}",
                    record.id,
                    source
                );
                events.push(EewTransitionEvent {
                    transition: EewTransition::BecameCancelled,
                    record: record.clone(),
                });
                mutated = true;
            }
        }
        mutated
    }

    fn replace_locked(
        &mut self,
        record: EewRecord,
        updated_time: DateTime<Utc>,
        events: &mut Vec<EewTransitionEvent>,
    ) {
        let id = record.id.clone();
        match self.records.get_mut(&id) {
            None => {
                let mut fresh = record;
                fresh.updated_time = updated_time;
                log::info!(
                    "Eew reconciler: new record {} (count {}) from {}",
                    id,
                    fresh.count,
                    fresh.source
                );
                events.push(EewTransitionEvent {
                    transition: EewTransition::FirstArrival,
                    record: fresh.clone(),
                });
                self.records.insert(id, fresh);
            }
            Some(cached) => {
                let wins = record.count > cached.count
                    || (record.count >= cached.count
                        && record.source.precedence() > cached.source.precedence());
                if wins {
                    let transition = classify_replacement(cached, &record);
                    let mut fresh = record;
                    fresh.updated_time = updated_time;
                    log::info!(
                        "Eew reconciler: record {} now count {} from {}",
                        id,
                        fresh.count,
                        fresh.source
                    );
                    if let Some(transition) = transition {
                        events.push(EewTransitionEvent {
                            transition,
                            record: fresh.clone(),
                        });
                    }
                    *cached = fresh;
                } else {
                    // Losing duplicates still count as a sign of life.
                    log::debug!(
                        "Eew reconciler: record {} refreshed by {} without replacement",
                        id,
                        record.source
                    );
                    cached.updated_time = updated_time;
                }
            }
        }
    }

    fn publish_locked(&mut self) {
        let mut all: Vec<EewRecord> = self.records.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        self.snapshot = Arc::new(all);
    }
}

/// Classify what a winning replacement means for notification purposes.
fn classify_replacement(cached: &EewRecord, incoming: &EewRecord) -> Option<EewTransition> {
    if incoming.is_cancelled && !cached.is_cancelled {
        Some(EewTransition::BecameCancelled)
    } else if incoming.is_final && !cached.is_final {
        Some(EewTransition::BecameFinal)
    } else if incoming.count > cached.count {
        Some(EewTransition::CountIncrease)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reconciler() -> EewReconciler {
        EewReconciler::new(EewConfig::default())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(id: &str, source: EewSource, count: u32) -> EewRecord {
        EewRecord::new(id, source, count, t0())
    }

    #[test]
    fn test_first_arrival_is_cached_and_classified() {
        let rec = reconciler();
        let events = rec.submit(
            Some(record("E1", EewSource::Telegram, 1)),
            t0(),
            EewSource::Telegram,
        );

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transition, EewTransition::FirstArrival);
        assert_eq!(rec.active_count(), 1);
        assert_eq!(rec.record("E1").unwrap().count, 1);
    }

    #[test]
    fn test_higher_count_replaces() {
        let rec = reconciler();
        rec.submit(
            Some(record("E1", EewSource::Telegram, 1)),
            t0(),
            EewSource::Telegram,
        );
        let events = rec.submit(
            Some(record("E1", EewSource::Telegram, 2)),
            t0() + Duration::seconds(2),
            EewSource::Telegram,
        );

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transition, EewTransition::CountIncrease);
        assert_eq!(rec.record("E1").unwrap().count, 2);
    }

    #[test]
    fn test_lower_count_only_refreshes_timestamp() {
        let rec = reconciler();
        rec.submit(
            Some(record("E1", EewSource::Telegram, 3)),
            t0(),
            EewSource::Telegram,
        );

        let later = t0() + Duration::seconds(5);
        let events = rec.submit(
            Some(record("E1", EewSource::Telegram, 2)),
            later,
            EewSource::Telegram,
        );

        assert!(events.is_empty());
        let cached = rec.record("E1").unwrap();
        assert_eq!(cached.count, 3);
        assert_eq!(cached.updated_time, later);
    }

    #[test]
    fn test_equal_count_higher_precedence_wins() {
        let rec = reconciler();
        rec.submit(
            Some(record("E1", EewSource::ContinuousSelf, 4)),
            t0(),
            EewSource::ContinuousSelf,
        );
        rec.submit(
            Some(record("E1", EewSource::Telegram, 4)),
            t0() + Duration::seconds(1),
            EewSource::Telegram,
        );

        assert_eq!(rec.record("E1").unwrap().source, EewSource::Telegram);
    }

    #[test]
    fn test_equal_count_lower_precedence_loses() {
        let rec = reconciler();
        rec.submit(
            Some(record("E1", EewSource::Telegram, 4)),
            t0(),
            EewSource::Telegram,
        );
        rec.submit(
            Some(record("E1", EewSource::PeerLog, 4)),
            t0() + Duration::seconds(1),
            EewSource::PeerLog,
        );

        assert_eq!(rec.record("E1").unwrap().source, EewSource::Telegram);
    }

    #[test]
    fn test_silence_cancels_continuous_source_records_only() {
        let rec = reconciler();
        rec.submit(
            Some(record("SELF", EewSource::ContinuousSelf, 1)),
            t0(),
            EewSource::ContinuousSelf,
        );
        rec.submit(
            Some(record("WIRE", EewSource::Telegram, 1)),
            t0(),
            EewSource::Telegram,
        );

        let later = t0() + Duration::seconds(2);
        let events = rec.submit(None, later, EewSource::ContinuousSelf);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transition, EewTransition::BecameCancelled);
        assert_eq!(events[0].record.id, "SELF");

        assert!(rec.record("SELF").unwrap().is_cancelled);
        assert!(!rec.record("WIRE").unwrap().is_cancelled);
    }

    #[test]
    fn test_silence_spares_final_records() {
        let rec = reconciler();
        let mut final_record = record("SELF", EewSource::ContinuousSelf, 9);
        final_record.is_final = true;
        rec.submit(Some(final_record), t0(), EewSource::ContinuousSelf);

        let events = rec.submit(None, t0() + Duration::seconds(2), EewSource::ContinuousSelf);
        assert!(events.is_empty());
        assert!(!rec.record("SELF").unwrap().is_cancelled);
    }

    #[test]
    fn test_silence_from_telegram_source_cancels_nothing() {
        let rec = reconciler();
        rec.submit(
            Some(record("WIRE", EewSource::Telegram, 1)),
            t0(),
            EewSource::Telegram,
        );

        let events = rec.submit(None, t0() + Duration::seconds(5), EewSource::Telegram);
        assert!(events.is_empty());
        assert!(!rec.record("WIRE").unwrap().is_cancelled);
    }

    #[test]
    fn test_general_staleness_window() {
        let rec = reconciler();
        rec.submit(
            Some(record("WIRE", EewSource::Telegram, 1)),
            t0(),
            EewSource::Telegram,
        );

        assert_eq!(rec.sweep(t0() + Duration::seconds(59)), 0);
        assert_eq!(rec.active_count(), 1);

        assert_eq!(rec.sweep(t0() + Duration::seconds(60)), 1);
        assert_eq!(rec.active_count(), 0);
    }

    #[test]
    fn test_continuous_records_go_stale_sooner() {
        let rec = reconciler();
        rec.submit(
            Some(record("SELF", EewSource::ContinuousSelf, 1)),
            t0(),
            EewSource::ContinuousSelf,
        );
        rec.submit(
            Some(record("WIRE", EewSource::Telegram, 1)),
            t0(),
            EewSource::Telegram,
        );

        // Default continuous window is 10 s; the telegram record survives.
        assert_eq!(rec.sweep(t0() + Duration::seconds(10)), 1);
        assert!(rec.record("SELF").is_none());
        assert!(rec.record("WIRE").is_some());
    }

    #[test]
    fn test_submit_runs_staleness_sweep_first() {
        let rec = reconciler();
        rec.submit(
            Some(record("OLD", EewSource::Telegram, 5)),
            t0(),
            EewSource::Telegram,
        );

        // Same id arrives after the old entry went stale: it is a fresh
        // first arrival, not a count comparison against the stale entry.
        let much_later = t0() + Duration::seconds(120);
        let events = rec.submit(
            Some(record("OLD", EewSource::Telegram, 1)),
            much_later,
            EewSource::Telegram,
        );

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transition, EewTransition::FirstArrival);
        assert_eq!(rec.record("OLD").unwrap().count, 1);
    }

    #[test]
    fn test_became_final_outranks_count_increase() {
        let rec = reconciler();
        rec.submit(
            Some(record("E1", EewSource::Telegram, 1)),
            t0(),
            EewSource::Telegram,
        );

        let mut final_record = record("E1", EewSource::Telegram, 2);
        final_record.is_final = true;
        let events = rec.submit(
            Some(final_record),
            t0() + Duration::seconds(1),
            EewSource::Telegram,
        );

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transition, EewTransition::BecameFinal);
    }

    #[test]
    fn test_empty_id_record_is_treated_as_absence() {
        let rec = reconciler();
        rec.submit(
            Some(record("SELF", EewSource::ContinuousSelf, 1)),
            t0(),
            EewSource::ContinuousSelf,
        );

        let events = rec.submit(
            Some(record("", EewSource::ContinuousSelf, 1)),
            t0() + Duration::seconds(1),
            EewSource::ContinuousSelf,
        );

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transition, EewTransition::BecameCancelled);
        assert_eq!(rec.active_count(), 1);
    }

    #[test]
    fn test_snapshot_is_sorted_and_immutable() {
        let rec = reconciler();
        rec.submit(
            Some(record("B", EewSource::Telegram, 1)),
            t0(),
            EewSource::Telegram,
        );
        let before = rec.snapshot();

        rec.submit(
            Some(record("A", EewSource::Telegram, 1)),
            t0() + Duration::seconds(1),
            EewSource::Telegram,
        );
        let after = rec.snapshot();

        // The earlier snapshot is untouched by the later mutation.
        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id, "A");
        assert_eq!(after[1].id, "B");
    }

    #[test]
    fn test_observers_see_transitions() {
        use std::sync::Mutex;

        let rec = reconciler();
        let seen: Arc<Mutex<Vec<EewTransition>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        rec.subscribe(move |event| {
            sink.lock().unwrap().push(event.transition);
        });

        rec.submit(
            Some(record("E1", EewSource::Telegram, 1)),
            t0(),
            EewSource::Telegram,
        );
        rec.submit(
            Some(record("E1", EewSource::Telegram, 2)),
            t0() + Duration::seconds(1),
            EewSource::Telegram,
        );

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![EewTransition::FirstArrival, EewTransition::CountIncrease]
        );
    }
}
