use chrono::{DateTime, TimeZone, Utc};

use shindo_core::api::StationId;
use shindo_core::models::{
    EewRecord, EewSource, GeoCoordinate, Rgb, StationCatalogEntry, TravelTimeEntry,
    TravelTimeTable,
};
use shindo_core::services::StationSample;

/// Fixed reference instant shared by the integration tests.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// A north-south chain of stations, `spacing_deg` degrees of latitude apart
/// (0.45 degrees is roughly 50 km).
pub fn chain_catalog(count: usize, spacing_deg: f64) -> Vec<StationCatalogEntry> {
    (0..count)
        .map(|i| {
            StationCatalogEntry::new(
                StationId::new(i as i64 + 1),
                format!("ST{}", i + 1),
                GeoCoordinate::new(35.0 + i as f64 * spacing_deg, 139.0).unwrap(),
            )
        })
        .collect()
}

pub fn sample(id: i64, intensity: f64) -> StationSample {
    StationSample::new(
        StationId::new(id),
        Some(intensity),
        Some(Rgb::new(255, 140, 0)),
    )
}

pub fn silent_sample(id: i64) -> StationSample {
    StationSample::new(StationId::new(id), None, None)
}

pub fn eew_record(id: &str, source: EewSource, count: u32, t: DateTime<Utc>) -> EewRecord {
    EewRecord::new(id, source, count, t)
}

/// A small two-depth travel-time table with regular breakpoints.
pub fn travel_time_table() -> TravelTimeTable {
    let mut entries = Vec::new();
    for (depth, p_step_ms, s_step_ms) in [(10, 3000_i64, 5500_i64), (50, 2600_i64, 4800_i64)] {
        for i in 1..=6_i64 {
            entries.push(TravelTimeEntry {
                depth_km: depth,
                distance_km: i as f64 * 25.0,
                p_arrival_ms: i * p_step_ms,
                s_arrival_ms: i * s_step_ms,
            });
        }
    }
    TravelTimeTable::from_entries(entries).unwrap()
}
