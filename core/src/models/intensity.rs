//! Intensity classification and shaking severity levels.

use serde::{Deserialize, Serialize};

/// Severity level of a shake event, classified from scalar intensity.
///
/// Variants are ordered from weakest to strongest, so `max` picks the more
/// severe of two levels.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Weak,
    Medium,
    Strong,
    Strongest,
}

impl EventLevel {
    /// Classify a scalar intensity value into a severity level.
    ///
    /// Boundary-exact: a value sitting exactly on a boundary falls into the
    /// lower band. Out-of-scale values classify into the extreme buckets
    /// rather than being rejected.
    pub fn classify(intensity: f64) -> Self {
        match intensity {
            i if i > 4.5 => EventLevel::Strongest,
            i if i > 2.5 => EventLevel::Strong,
            i if i > 0.5 => EventLevel::Medium,
            _ => EventLevel::Weak,
        }
    }

    /// Seconds a member station stays linked after its latest qualifying
    /// sample at this level.
    pub fn expiry_seconds(&self) -> i64 {
        match self {
            EventLevel::Strongest | EventLevel::Strong => 90,
            EventLevel::Medium => 30,
            EventLevel::Weak => 15,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventLevel::Weak => "weak",
            EventLevel::Medium => "medium",
            EventLevel::Strong => "strong",
            EventLevel::Strongest => "strongest",
        }
    }
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 24-bit RGB color attached to station samples and shake events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
