//! Error types for the monitoring core.

use crate::api::StationId;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Error type for core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A station catalog listed the same station identifier twice.
    #[error("Duplicate station in catalog: {0}")]
    DuplicateStation(StationId),

    /// The travel-time table contained no usable entries.
    #[error("Travel-time table has no entries")]
    EmptyTravelTimeTable,

    /// A line of the travel-time table could not be parsed.
    #[error("Travel-time table line {line}: {message}")]
    TravelTimeParse { line: usize, message: String },
}

impl CoreError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a travel-time parse error for a 1-based line number.
    pub fn travel_time_parse(line: usize, message: impl Into<String>) -> Self {
        Self::TravelTimeParse {
            line,
            message: message.into(),
        }
    }
}
