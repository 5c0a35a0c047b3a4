//! # Matcher Module
//!
//! Decides whether two assets are duplicates using capture metadata only.
//!
//! ## Criteria
//! Two assets match when all of these hold:
//! - both have a creation timestamp and the timestamps are equal
//! - their media variant flags are equal
//! - their pixel width and height are equal
//!
//! A missing timestamp never matches, not even another missing timestamp.
//! Libraries full of assets without capture metadata would otherwise
//! collapse into one huge group.

mod traits;

pub use traits::MatchStrategy;

use crate::core::asset::Asset;
use serde::{Deserialize, Serialize};

/// Why two assets are not duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MismatchReason {
    /// At least one asset has no creation timestamp
    MissingTimestamp,
    /// Both have timestamps, but they differ
    TimestampDiffers,
    /// Same instant, different encoding variant (e.g. HDR sibling)
    VariantDiffers,
    /// Same instant and variant, different pixel dimensions (e.g. a crop)
    DimensionsDiffer,
}

impl std::fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MismatchReason::MissingTimestamp => write!(f, "Capture time unknown"),
            MismatchReason::TimestampDiffers => write!(f, "Captured at different times"),
            MismatchReason::VariantDiffers => write!(f, "Different encoding variant"),
            MismatchReason::DimensionsDiffer => write!(f, "Different dimensions"),
        }
    }
}

/// Result of comparing two assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Duplicate,
    Mismatch(MismatchReason),
}

impl MatchOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, MatchOutcome::Duplicate)
    }
}

/// The fixed metadata predicate: timestamp, variant and dimensions
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataMatcher;

impl MetadataMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Compare two assets and report the first criterion that fails.
    ///
    /// Criteria are checked in a fixed order, so the reason is the same
    /// whichever way round the assets are passed.
    pub fn compare(&self, a: &Asset, b: &Asset) -> MatchOutcome {
        let (Some(ts_a), Some(ts_b)) = (a.creation_timestamp, b.creation_timestamp) else {
            return MatchOutcome::Mismatch(MismatchReason::MissingTimestamp);
        };

        if ts_a != ts_b {
            return MatchOutcome::Mismatch(MismatchReason::TimestampDiffers);
        }

        if a.media_variant_flags != b.media_variant_flags {
            return MatchOutcome::Mismatch(MismatchReason::VariantDiffers);
        }

        if a.pixel_width != b.pixel_width || a.pixel_height != b.pixel_height {
            return MatchOutcome::Mismatch(MismatchReason::DimensionsDiffer);
        }

        MatchOutcome::Duplicate
    }
}

impl MatchStrategy for MetadataMatcher {
    fn is_duplicate(&self, a: &Asset, b: &Asset) -> bool {
        self.compare(a, b).is_duplicate()
    }

    fn description(&self) -> String {
        "Metadata strategy: same capture time, variant and dimensions".to_string()
    }
}

/// Shorthand for [`MetadataMatcher::is_duplicate`]
pub fn is_duplicate(a: &Asset, b: &Asset) -> bool {
    MetadataMatcher.is_duplicate(a, b)
}
