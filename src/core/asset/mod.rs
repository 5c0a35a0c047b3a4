//! # Asset Module
//!
//! The media item the scanner works on: an identity plus the capture
//! metadata used for matching. Nothing here is ever read from pixels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of an asset.
///
/// Scanner bookkeeping is keyed by this id, never by the asset value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Encoding variants of a capture (HDR, panorama, ...).
///
/// Two captures taken at the same instant with the same dimensions but a
/// different variant are siblings, not duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaVariantFlags(u32);

impl MediaVariantFlags {
    pub const NONE: Self = Self(0);
    pub const HDR: Self = Self(1 << 0);
    pub const PANORAMA: Self = Self(1 << 1);
    pub const SCREENSHOT: Self = Self(1 << 2);
    pub const LIVE_PHOTO: Self = Self(1 << 3);
    pub const DEPTH_EFFECT: Self = Self(1 << 4);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Human-readable names of the set flags
    pub fn names(self) -> Vec<&'static str> {
        const NAMED: [(MediaVariantFlags, &str); 5] = [
            (MediaVariantFlags::HDR, "HDR"),
            (MediaVariantFlags::PANORAMA, "Panorama"),
            (MediaVariantFlags::SCREENSHOT, "Screenshot"),
            (MediaVariantFlags::LIVE_PHOTO, "Live Photo"),
            (MediaVariantFlags::DEPTH_EFFECT, "Depth Effect"),
        ];

        NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl std::ops::BitOr for MediaVariantFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for MediaVariantFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Standard");
        }
        write!(f, "{}", self.names().join(" + "))
    }
}

/// A single media item as seen by the duplicate scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Stable identity (map key)
    pub id: AssetId,
    /// Capture time; `None` means unknown and never matches anything
    #[serde(default)]
    pub creation_timestamp: Option<DateTime<Utc>>,
    /// Encoding variant of the capture
    #[serde(default)]
    pub media_variant_flags: MediaVariantFlags,
    /// Width in pixels
    pub pixel_width: u32,
    /// Height in pixels
    pub pixel_height: u32,
    /// Where the asset lives, for display only (e.g. a file path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Asset {
    /// Create an asset with no variant flags and no location
    pub fn new(
        id: impl Into<AssetId>,
        creation_timestamp: Option<DateTime<Utc>>,
        pixel_width: u32,
        pixel_height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            creation_timestamp,
            media_variant_flags: MediaVariantFlags::NONE,
            pixel_width,
            pixel_height,
            location: None,
        }
    }

    pub fn with_variant(mut self, flags: MediaVariantFlags) -> Self {
        self.media_variant_flags = flags;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Dimensions as a formatted string
    pub fn dimensions_display(&self) -> String {
        format!("{}x{}", self.pixel_width, self.pixel_height)
    }
}

/// Order assets by capture time ascending, unknown times last, ties by id.
///
/// This is the reference enumeration order. The scanner's grouping does
/// not depend on it, only the order in which groups are discovered.
pub fn sort_by_creation(assets: &mut [Asset]) {
    assets.sort_by(|a, b| match (a.creation_timestamp, b.creation_timestamp) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
}
