//! # Scanner Module
//!
//! Groups likely duplicates in an ordered asset sequence.
//!
//! ## How It Works
//! Every asset is visited once as the asset "to match":
//! 1. If it matches the representative of a group found earlier, it is
//!    absorbed into that group and nothing else is done for it
//! 2. Otherwise every other asset is compared against it, and each match
//!    becomes a member of a group it represents (created on first match)
//!
//! No asset is ever a member of two groups, and once B is recorded under A,
//! A is never recorded under B.
//!
//! ## Cancellation
//! A [`CancelToken`] is checked before each outer asset and before each
//! inner comparison. A stopped scan keeps everything it found.

mod cancel;
mod engine;
mod handle;

pub use cancel::CancelToken;
pub use engine::{DuplicateScanner, ScanConfig, ScannerBuilder};
pub use handle::{ScanController, ScanHandle};

use crate::core::asset::Asset;
use crate::events::ScanSummary;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A representative asset and the duplicates found for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Stable identifier derived from the representative's id
    pub id: Uuid,
    /// The anchor of the group; never listed in `members`
    pub representative: Asset,
    /// Duplicates in discovery order; never empty
    pub members: Vec<Asset>,
}

impl DuplicateGroup {
    /// A group only comes into existence with its first member.
    pub(crate) fn new(representative: Asset, first_member: Asset) -> Self {
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, representative.id.as_str().as_bytes()),
            representative,
            members: vec![first_member],
        }
    }

    /// Number of duplicates, excluding the representative
    pub fn duplicate_count(&self) -> usize {
        self.members.len()
    }

    /// Representative followed by members
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        std::iter::once(&self.representative).chain(self.members.iter())
    }
}

/// Everything a scan has found so far.
///
/// Owned by the scan while it runs and handed to the caller once it ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanState {
    /// Assets fully examined as the asset to match
    pub processed_count: usize,
    /// Size of the input, fixed at scan start
    pub total_count: usize,
    /// Groups in representative discovery order
    pub groups: Vec<DuplicateGroup>,
    /// Whether the scan stopped on a cancel request
    pub cancelled: bool,
}

impl ScanState {
    pub(crate) fn new(total_count: usize) -> Self {
        Self {
            total_count,
            ..Self::default()
        }
    }

    /// Total duplicates across all groups
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.duplicate_count()).sum()
    }

    /// Whether the scan ran to the end of the input
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.processed_count == self.total_count
    }

    pub fn summary(&self, duration_ms: u64) -> ScanSummary {
        ScanSummary {
            total_assets: self.total_count,
            processed_assets: self.processed_count,
            duplicate_groups: self.groups.len(),
            duplicate_count: self.duplicate_count(),
            cancelled: self.cancelled,
            duration_ms,
        }
    }
}
