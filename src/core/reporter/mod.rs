//! # Reporter Module
//!
//! Turns a finished [`ScanState`] into something a person or a script can
//! read. Nothing here is used by the scan itself.
//!
//! ## Formats
//! - JSON: summary plus every group, for scripting
//! - CSV: one row per asset per group, representative flagged

use crate::core::asset::Asset;
use crate::core::scanner::ScanState;
use crate::error::ReportError;
use crate::events::ScanSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Display form of a capture time
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) if ts.timestamp_subsec_millis() > 0 => {
            ts.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()
        }
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "unknown".to_string(),
    }
}

/// Short label for an asset: its location if known, else its id
pub fn asset_label(asset: &Asset) -> &str {
    asset.location.as_deref().unwrap_or(asset.id.as_str())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    summary: &'a ScanSummary,
    groups: &'a [crate::core::scanner::DuplicateGroup],
}

/// Write the summary and all groups as pretty-printed JSON
pub fn export_json<W: Write>(
    state: &ScanState,
    summary: &ScanSummary,
    writer: W,
) -> Result<(), ReportError> {
    let report = JsonReport {
        summary,
        groups: &state.groups,
    };
    serde_json::to_writer_pretty(writer, &report)
        .map_err(|e| ReportError::SerializationFailed(e.to_string()))
}

/// Write one CSV row per asset in each group
///
/// Columns: Group ID, Asset ID, Is Representative, Captured, Variant,
/// Dimensions, Location
pub fn export_csv<W: Write>(state: &ScanState, mut writer: W) -> Result<(), ReportError> {
    writeln!(
        writer,
        "Group ID,Asset ID,Is Representative,Captured,Variant,Dimensions,Location"
    )?;

    for group in &state.groups {
        for asset in group.assets() {
            let is_representative = asset.id == group.representative.id;
            writeln!(
                writer,
                "{},{},{},{},{},{},{}",
                group.id,
                csv_field(asset.id.as_str()),
                is_representative,
                csv_field(&format_timestamp(asset.creation_timestamp)),
                csv_field(&asset.media_variant_flags.to_string()),
                asset.dimensions_display(),
                csv_field(asset.location.as_deref().unwrap_or("")),
            )?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Quote a field if it contains a delimiter, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
