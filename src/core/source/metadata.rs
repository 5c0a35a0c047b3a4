//! Capture metadata for image files.
//!
//! ## Extracted Fields
//! - Date taken (DateTimeOriginal, refined by SubSecTimeOriginal)
//! - Image dimensions (EXIF pixel dimensions, else the image header)
//! - Variant flags, from filename conventions
//!
//! EXIF is typically found in JPEG, TIFF and HEIC files. Files without
//! it still get dimensions from their header but no capture time.

use crate::core::asset::MediaVariantFlags;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use exif::{In, Reader, Tag, Value};
use regex::Regex;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;

/// What a file tells us about its capture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureMetadata {
    /// Original capture date/time
    pub date_taken: Option<DateTime<Utc>>,
    /// Image width in pixels
    pub width: Option<u32>,
    /// Image height in pixels
    pub height: Option<u32>,
}

impl CaptureMetadata {
    /// Read EXIF, falling back to the image header for dimensions
    pub fn read(path: &Path) -> Self {
        let mut metadata = read_exif(path).unwrap_or_default();

        if metadata.width.is_none() || metadata.height.is_none() {
            if let Ok((w, h)) = image::image_dimensions(path) {
                metadata.width = Some(w);
                metadata.height = Some(h);
            }
        }

        metadata
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}

fn read_exif(path: &Path) -> Option<CaptureMetadata> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(&file);
    let exif_reader = Reader::new().read_from_container(&mut bufreader).ok()?;

    let mut metadata = CaptureMetadata::default();

    if let Some(field) = exif_reader.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
        let subsec = exif_reader
            .get_field(Tag::SubSecTimeOriginal, In::PRIMARY)
            .and_then(|f| get_string_value(&f.value));
        metadata.date_taken = get_string_value(&field.value)
            .and_then(|s| parse_exif_datetime(&s, subsec.as_deref()));
    }

    // Prefer actual pixel dimensions
    if let Some(field) = exif_reader.get_field(Tag::PixelXDimension, In::PRIMARY) {
        metadata.width = get_u32_value(&field.value);
    }
    if let Some(field) = exif_reader.get_field(Tag::PixelYDimension, In::PRIMARY) {
        metadata.height = get_u32_value(&field.value);
    }

    if metadata.width.is_none() {
        if let Some(field) = exif_reader.get_field(Tag::ImageWidth, In::PRIMARY) {
            metadata.width = get_u32_value(&field.value);
        }
    }
    if metadata.height.is_none() {
        if let Some(field) = exif_reader.get_field(Tag::ImageLength, In::PRIMARY) {
            metadata.height = get_u32_value(&field.value);
        }
    }

    Some(metadata)
}

/// Parse "YYYY:MM:DD HH:MM:SS" plus optional sub-second digits.
///
/// Burst shots share a second; the sub-second digits keep them apart.
pub(crate) fn parse_exif_datetime(s: &str, subsec: Option<&str>) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y:%m:%d %H:%M:%S").ok()?;
    let mut taken = DateTime::from_naive_utc_and_offset(naive, Utc);

    if let Some(digits) = subsec.map(str::trim).filter(|d| !d.is_empty()) {
        if digits.chars().all(|c| c.is_ascii_digit()) {
            // "5" is 500ms, "123456" is 123.456ms; keep nanosecond precision
            let padded: String = digits.chars().chain(std::iter::repeat('0')).take(9).collect();
            if let Ok(nanos) = padded.parse::<i64>() {
                taken += Duration::nanoseconds(nanos);
            }
        }
    }

    Some(taken)
}

/// Helper to extract u32 from various EXIF value types
fn get_u32_value(value: &Value) -> Option<u32> {
    match value {
        Value::Long(vec) => vec.first().copied(),
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        _ => None,
    }
}

/// Helper to extract string from EXIF ASCII value
fn get_string_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            if let Ok(s) = std::str::from_utf8(bytes) {
                let trimmed = s.trim_end_matches('\0').trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Filename conventions cameras and phones use for capture variants
fn variant_patterns() -> &'static [(Regex, MediaVariantFlags)] {
    static PATTERNS: OnceLock<Vec<(Regex, MediaVariantFlags)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"(?i)(^|[_\-\s])HDR([_\-\s.]|$)", MediaVariantFlags::HDR),
            (r"(?i)(^|[_\-\s])PANO([_\-\s.]|$)", MediaVariantFlags::PANORAMA),
            (r"(?i)screen[\s_-]?shot", MediaVariantFlags::SCREENSHOT),
            (r"(?i)(^|[_\-\s])PORTRAIT([_\-\s.]|$)", MediaVariantFlags::DEPTH_EFFECT),
        ]
        .into_iter()
        .map(|(pattern, flag)| (Regex::new(pattern).expect("variant pattern is valid"), flag))
        .collect()
    })
}

/// Variant flags implied by a file's name
pub fn variant_from_filename(path: &Path) -> MediaVariantFlags {
    let Some(name) = path.file_stem().and_then(|n| n.to_str()) else {
        return MediaVariantFlags::NONE;
    };

    variant_patterns()
        .iter()
        .filter(|(pattern, _)| pattern.is_match(name))
        .fold(MediaVariantFlags::NONE, |flags, (_, flag)| flags | *flag)
}
