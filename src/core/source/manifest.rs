//! JSON manifest source.
//!
//! A manifest is a JSON array of assets, as exported from a photo library:
//!
//! ```json
//! [
//!   {"id": "IMG_0001", "creation_timestamp": "2021-01-02T10:20:30Z",
//!    "media_variant_flags": 0, "pixel_width": 4032, "pixel_height": 3024}
//! ]
//! ```

use super::{sort_by_creation, AssetSource};
use crate::core::asset::Asset;
use crate::error::SourceError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads assets from a JSON manifest file
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AssetSource for ManifestSource {
    fn fetch_all(&self) -> Result<Vec<Asset>, SourceError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                SourceError::ReadFailed {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let mut assets: Vec<Asset> =
            serde_json::from_str(&contents).map_err(|e| SourceError::InvalidManifest {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        debug!(path = %self.path.display(), count = assets.len(), "Loaded manifest");
        sort_by_creation(&mut assets);
        Ok(assets)
    }
}
