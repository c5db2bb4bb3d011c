//! Monitoring core configuration file support.
//!
//! This module provides utilities for reading the tuning parameters of the
//! monitoring core from TOML configuration files. Every field has a default,
//! so an empty file (or no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CoreError;

/// Monitoring core configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub eew: EewConfig,
}

/// Shake cluster engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Radius in kilometres within which two stations count as neighbors.
    #[serde(default = "default_nearby_radius_km")]
    pub nearby_radius_km: f64,
    /// Minimum rising trend a linked neighbor must show for an unlinked
    /// shaking station to join its event rather than found a new one.
    /// Heuristic; kept configurable for field tuning.
    #[serde(default = "default_activation_diff_threshold")]
    pub activation_diff_threshold: f64,
}

/// EEW reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EewConfig {
    /// Seconds after the last refresh at which a cached report is dropped.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: i64,
    /// Extra seconds subtracted from the staleness window for reports from
    /// continuously polled sources, which refresh on every poll cycle.
    #[serde(default = "default_continuous_stale_offset_secs")]
    pub continuous_stale_offset_secs: i64,
}

fn default_nearby_radius_km() -> f64 {
    120.0
}

fn default_activation_diff_threshold() -> f64 {
    0.5
}

fn default_stale_after_secs() -> i64 {
    60
}

fn default_continuous_stale_offset_secs() -> i64 {
    10
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            nearby_radius_km: default_nearby_radius_km(),
            activation_diff_threshold: default_activation_diff_threshold(),
        }
    }
}

impl Default for EewConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: default_stale_after_secs(),
            continuous_stale_offset_secs: default_continuous_stale_offset_secs(),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            eew: EewConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Load core configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(CoreConfig)` if successful
    /// * `Err(CoreError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| CoreError::configuration(format!("Failed to read config file: {}", e)))?;

        let config: CoreConfig = toml::from_str(&content)
            .map_err(|e| CoreError::configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }
}
