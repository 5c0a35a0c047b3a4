//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the duplicate asset finder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Asset enumeration events
    Source(SourceEvent),
    /// Duplicate scan events
    Scan(ScanEvent),
}

/// Events while an asset source is being enumerated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SourceEvent {
    /// Enumeration has started
    Started { paths: Vec<PathBuf> },
    /// A file was skipped but enumeration continues
    Skipped { path: PathBuf, message: String },
    /// Enumeration completed
    Completed { total_assets: usize },
}

/// Events during the duplicate scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// The scan has started
    Started { total_assets: usize },
    /// One outer asset has been fully examined
    Progress(ScanProgress),
    /// The scan ran to the end of the input
    Completed { summary: ScanSummary },
    /// The scan observed a stop request; the summary carries the partial counts
    Cancelled { summary: ScanSummary },
}

/// Progress information during the duplicate scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Assets fully examined so far
    pub processed: usize,
    /// Size of the input
    pub total: usize,
    /// Duplicate groups found so far
    pub groups_found: usize,
}

/// Summary of a finished (or stopped) scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Size of the input
    pub total_assets: usize,
    /// Assets fully examined before the scan ended
    pub processed_assets: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Number of duplicates, excluding representatives
    pub duplicate_count: usize,
    /// Whether the scan was stopped early
    pub cancelled: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
