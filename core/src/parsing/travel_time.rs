//! Parser for the packaged travel-time table.
//!
//! The table is a plain-text resource with one entry per line:
//!
//! ```text
//! # depth_km  distance_km  p_arrival_s  s_arrival_s
//! 10  25.0   5.2   9.0
//! 10  50.0   8.4  14.6
//! ```
//!
//! Lines starting with `#` and blank lines are skipped. Arrival times are
//! given in seconds and stored internally in milliseconds.

use anyhow::{Context, Result};
use std::path::Path;

use crate::error::CoreError;
use crate::models::{TravelTimeEntry, TravelTimeTable};

/// Parse a travel-time table from a file.
pub fn parse_travel_time_file(path: &Path) -> Result<TravelTimeTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read travel-time table: {}", path.display()))?;

    parse_travel_time_str(&content)
}

/// Parse a travel-time table from a string.
pub fn parse_travel_time_str(input: &str) -> Result<TravelTimeTable> {
    let entries = parse_entries(input)?;
    let table = TravelTimeTable::from_entries(entries)
        .context("Travel-time table resource is unusable")?;

    log::info!(
        "Loaded travel-time table: {} entries across {} depth buckets",
        table.entry_count(),
        table.depths().len()
    );
    Ok(table)
}

/// Parse the individual entries, reporting the first malformed line.
pub fn parse_entries(input: &str) -> Result<Vec<TravelTimeEntry>, CoreError> {
    let mut entries = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.push(parse_line(idx + 1, line)?);
    }

    Ok(entries)
}

fn parse_line(line_no: usize, line: &str) -> Result<TravelTimeEntry, CoreError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(CoreError::travel_time_parse(
            line_no,
            format!("expected 4 fields, found {}", fields.len()),
        ));
    }

    let depth_km: i32 = fields[0].parse().map_err(|_| {
        CoreError::travel_time_parse(line_no, format!("invalid depth: {}", fields[0]))
    })?;
    let distance_km: f64 = fields[1].parse().map_err(|_| {
        CoreError::travel_time_parse(line_no, format!("invalid distance: {}", fields[1]))
    })?;
    let p_arrival_s: f64 = fields[2].parse().map_err(|_| {
        CoreError::travel_time_parse(line_no, format!("invalid P arrival: {}", fields[2]))
    })?;
    let s_arrival_s: f64 = fields[3].parse().map_err(|_| {
        CoreError::travel_time_parse(line_no, format!("invalid S arrival: {}", fields[3]))
    })?;

    Ok(TravelTimeEntry {
        depth_km,
        distance_km,
        p_arrival_ms: (p_arrival_s * 1000.0).round() as i64,
        s_arrival_ms: (s_arrival_s * 1000.0).round() as i64,
    })
}
