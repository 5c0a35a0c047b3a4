//! # Source Module
//!
//! Where assets come from. The scanner only needs a materialized,
//! stably ordered `Vec<Asset>`; sources provide one.
//!
//! ## Sources
//! - `VecSource` - assets already in memory, order kept as given
//! - `ManifestSource` - a JSON array of assets exported from a library
//! - `DirectorySource` - image files on disk, metadata from EXIF
//!
//! File-backed sources return assets in capture-time order, unknown
//! times last.

mod directory;
mod filter;
mod manifest;
mod metadata;

pub use directory::{DirectorySource, DirectorySourceConfig};
pub use filter::ImageFilter;
pub use manifest::ManifestSource;
pub use metadata::{variant_from_filename, CaptureMetadata};

pub use crate::core::asset::sort_by_creation;

use crate::core::asset::Asset;
use crate::core::scanner::CancelToken;
use crate::error::SourceError;
use crate::events::EventSender;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Supplies the ordered asset sequence for a scan
pub trait AssetSource: Send + Sync {
    /// Materialize every asset, in the order the scan should visit them
    fn fetch_all(&self) -> Result<Vec<Asset>, SourceError>;
}

/// Assets already in memory
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    assets: Vec<Asset>,
}

impl VecSource {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }
}

impl AssetSource for VecSource {
    fn fetch_all(&self) -> Result<Vec<Asset>, SourceError> {
        Ok(self.assets.clone())
    }
}

/// Load assets from a mix of directories and `.json` manifests.
///
/// Overlapping roots (`~/Photos` and `~/Photos/2021`) yield each file once:
/// an id seen before is dropped. The combined list is re-sorted by capture
/// time so the scan order does not depend on argument order.
///
/// Once `cancel` fires, remaining paths are skipped and whatever was read
/// so far is returned.
pub fn load_paths(
    paths: &[impl AsRef<Path>],
    config: &DirectorySourceConfig,
    cancel: &CancelToken,
    events: &EventSender,
) -> Result<Vec<Asset>, SourceError> {
    let mut assets = Vec::new();

    for path in paths {
        if cancel.is_cancelled() {
            debug!("Loading cancelled");
            break;
        }

        let path = path.as_ref();
        if !path.exists() {
            return Err(SourceError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let is_manifest = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_manifest {
            assets.extend(ManifestSource::new(path).fetch_all()?);
        } else {
            let source = DirectorySource::new(vec![path.to_path_buf()], config.clone())
                .with_cancel(cancel.clone());
            assets.extend(source.fetch_with_events(events)?);
        }
    }

    let mut seen = HashSet::with_capacity(assets.len());
    assets.retain(|asset| {
        let first = seen.insert(asset.id.clone());
        if !first {
            debug!(id = %asset.id, "Dropping asset reached through more than one path");
        }
        first
    });

    sort_by_creation(&mut assets);
    Ok(assets)
}
