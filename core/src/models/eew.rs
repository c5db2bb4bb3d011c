//! Earthquake Early Warning records and their reconciliation metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::geo::GeoCoordinate;

/// Origin of an EEW record.
///
/// Sources are unequally trustworthy. Each variant maps to a fixed
/// precedence class used to break ties during replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EewSource {
    /// Derived locally from the continuously polled realtime feed.
    ContinuousSelf,
    /// Relayed from another monitor's log stream.
    PeerLog,
    /// Decoded from an official telegram broadcast.
    Telegram,
}

impl EewSource {
    /// Numeric precedence class. Higher wins ties during replacement.
    pub fn precedence(&self) -> u8 {
        match self {
            EewSource::ContinuousSelf => 0,
            EewSource::PeerLog => 1,
            EewSource::Telegram => 2,
        }
    }

    /// Whether this source refreshes on every poll cycle, making silence
    /// itself informative.
    pub fn is_continuous(&self) -> bool {
        matches!(self, EewSource::ContinuousSelf)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EewSource::ContinuousSelf => "continuous_self",
            EewSource::PeerLog => "peer_log",
            EewSource::Telegram => "telegram",
        }
    }
}

impl std::fmt::Display for EewSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reliability flags attached to an EEW report's estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EewAccuracy {
    pub epicenter: bool,
    pub depth: bool,
    pub magnitude: bool,
}

/// One reconciled EEW report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EewRecord {
    /// Report identifier, scoped to the originating source.
    pub id: String,
    pub source: EewSource,
    /// Report sequence number, intended to be monotonic per id.
    pub count: u32,
    pub is_final: bool,
    pub is_cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypocenter: Option<GeoCoordinate>,
    /// Hypocenter depth in kilometres.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_km: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<f64>,
    /// Forecast intensity bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity_max: Option<f64>,
    #[serde(default)]
    pub accuracy: EewAccuracy,
    /// Estimated rupture origin time, used for wavefront estimation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_time: Option<DateTime<Utc>>,
    /// Last time this record was touched, independent of report content.
    pub updated_time: DateTime<Utc>,
}

impl EewRecord {
    pub fn new(
        id: impl Into<String>,
        source: EewSource,
        count: u32,
        updated_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            source,
            count,
            is_final: false,
            is_cancelled: false,
            hypocenter: None,
            depth_km: None,
            magnitude: None,
            intensity_min: None,
            intensity_max: None,
            accuracy: EewAccuracy::default(),
            origin_time: None,
            updated_time,
        }
    }
}

/// How a submission changed the reconciled cache, for notification hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EewTransition {
    /// First report seen for this id.
    FirstArrival,
    /// A later report with a higher sequence count replaced the cached one.
    CountIncrease,
    /// The report became final.
    BecameFinal,
    /// The report was cancelled, explicitly or by source silence.
    BecameCancelled,
}

impl EewTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            EewTransition::FirstArrival => "first_arrival",
            EewTransition::CountIncrease => "count_increase",
            EewTransition::BecameFinal => "became_final",
            EewTransition::BecameCancelled => "became_cancelled",
        }
    }
}

impl std::fmt::Display for EewTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload handed to the notification hook after a cache mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EewTransitionEvent {
    pub transition: EewTransition,
    /// The cached record as it stands after the mutation.
    pub record: EewRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_telegram_outranks_other_sources() {
        assert!(EewSource::Telegram.precedence() > EewSource::PeerLog.precedence());
        assert!(EewSource::PeerLog.precedence() > EewSource::ContinuousSelf.precedence());
    }

    #[test]
    fn test_only_the_local_feed_is_continuous() {
        assert!(EewSource::ContinuousSelf.is_continuous());
        assert!(!EewSource::PeerLog.is_continuous());
        assert!(!EewSource::Telegram.is_continuous());
    }

    #[test]
    fn test_new_record_defaults() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let record = EewRecord::new("240301120000", EewSource::Telegram, 1, t);

        assert_eq!(record.id, "240301120000");
        assert_eq!(record.count, 1);
        assert!(!record.is_final);
        assert!(!record.is_cancelled);
        assert_eq!(record.hypocenter, None);
        assert_eq!(record.accuracy, EewAccuracy::default());
    }

    #[test]
    fn test_transition_labels() {
        assert_eq!(EewTransition::FirstArrival.as_str(), "first_arrival");
        assert_eq!(EewTransition::BecameCancelled.to_string(), "became_cancelled");
    }

    #[test]
    fn test_record_serializes_sparsely() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let record = EewRecord::new("240301120000", EewSource::PeerLog, 3, t);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"source\":\"peer_log\""));
        assert!(json.contains("\"count\":3"));
        // The location confidence flag covers the surface point; depth has
        // its own flag.
        assert!(json.contains("\"accuracy\":{\"epicenter\":false,\"depth\":false,\"magnitude\":false}"));
        // Unset estimates are omitted instead of serialized as null.
        assert!(!json.contains("hypocenter"));
        assert!(!json.contains("origin_time"));

        let back: EewRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, record.id);
        assert_eq!(back.count, record.count);
    }
}
