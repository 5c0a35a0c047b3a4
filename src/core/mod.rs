//! # Core Module
//!
//! The UI-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `asset` - The media item model and its identity
//! - `matcher` - Decides whether two assets are duplicates
//! - `scanner` - Groups duplicates, with progress and cancellation
//! - `source` - Enumerates assets from memory, manifests or directories
//! - `reporter` - Formats and exports scan results

pub mod asset;
pub mod matcher;
pub mod reporter;
pub mod scanner;
pub mod source;

// Re-export commonly used types
pub use asset::{Asset, AssetId, MediaVariantFlags};
pub use matcher::{is_duplicate, MatchOutcome, MatchStrategy, MetadataMatcher, MismatchReason};
pub use scanner::{
    CancelToken, DuplicateGroup, DuplicateScanner, ScanController, ScanHandle, ScanState,
};
pub use source::{AssetSource, DirectorySource, ManifestSource, VecSource};
