//! Integration tests for asset sources and reporting.
//!
//! These tests build real files on disk and check the whole path from
//! enumeration through scanning to exported reports.

use assert_fs::prelude::*;
use assert_fs::TempDir;
use duplicate_asset_finder::core::reporter::{export_csv, export_json};
use duplicate_asset_finder::core::source::{load_paths, DirectorySourceConfig};
use duplicate_asset_finder::core::{
    AssetSource, CancelToken, DirectorySource, DuplicateScanner, ManifestSource,
};
use duplicate_asset_finder::error::SourceError;
use duplicate_asset_finder::events::{null_sender, Event, EventChannel, SourceEvent};
use predicates::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};

const MANIFEST: &str = r#"[
  {"id": "IMG_0003", "creation_timestamp": "2021-01-02T10:20:30Z", "pixel_width": 4032, "pixel_height": 3024},
  {"id": "IMG_0001", "creation_timestamp": "2021-01-02T10:20:30Z", "pixel_width": 4032, "pixel_height": 3024},
  {"id": "IMG_0002", "creation_timestamp": "2021-01-02T10:20:30Z", "media_variant_flags": 1, "pixel_width": 4032, "pixel_height": 3024},
  {"id": "IMG_0004", "pixel_width": 4032, "pixel_height": 3024}
]"#;

fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::new(width, height).save(path).unwrap();
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

#[test]
fn manifest_scan_groups_exact_copies_only() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.child("library.json");
    manifest.write_str(MANIFEST).unwrap();

    let assets = ManifestSource::new(manifest.path()).fetch_all().unwrap();
    let state = DuplicateScanner::new()
        .scan(&assets, &CancelToken::new(), &())
        .unwrap();

    // IMG_0002 is the HDR sibling and IMG_0004 has no capture time
    assert_eq!(state.groups.len(), 1);
    assert_eq!(state.groups[0].representative.id.as_str(), "IMG_0001");
    assert_eq!(state.groups[0].members[0].id.as_str(), "IMG_0003");
    assert_eq!(state.groups[0].members.len(), 1);
}

#[test]
fn csv_report_lists_representative_and_members() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.child("library.json");
    manifest.write_str(MANIFEST).unwrap();

    let assets = ManifestSource::new(manifest.path()).fetch_all().unwrap();
    let state = DuplicateScanner::new()
        .scan(&assets, &CancelToken::new(), &())
        .unwrap();

    let mut out = Vec::new();
    export_csv(&state, &mut out).unwrap();
    let csv = String::from_utf8(out).unwrap();

    assert!(predicate::str::starts_with("Group ID,Asset ID").eval(&csv));
    assert!(predicate::str::contains("IMG_0001,true,2021-01-02 10:20:30 UTC").eval(&csv));
    assert!(predicate::str::contains("IMG_0003,false").eval(&csv));
    assert!(predicate::str::contains("IMG_0002").not().eval(&csv));
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn json_report_carries_summary_and_groups() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.child("library.json");
    manifest.write_str(MANIFEST).unwrap();

    let assets = ManifestSource::new(manifest.path()).fetch_all().unwrap();
    let state = DuplicateScanner::new()
        .scan(&assets, &CancelToken::new(), &())
        .unwrap();

    let mut out = Vec::new();
    export_json(&state, &state.summary(5), &mut out).unwrap();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(report["total_assets"], 4);
    assert_eq!(report["duplicate_groups"], 1);
    assert_eq!(report["cancelled"], false);
    assert_eq!(report["groups"][0]["representative"]["id"], "IMG_0001");
}

#[test]
fn directory_without_capture_times_yields_no_groups() {
    let temp = TempDir::new().unwrap();
    write_png(temp.child("a.png").path(), 8, 8);
    write_png(temp.child("b.png").path(), 8, 8);

    let assets = DirectorySource::new(vec![temp.path().to_path_buf()], Default::default())
        .fetch_all()
        .unwrap();
    let state = DuplicateScanner::new()
        .scan(&assets, &CancelToken::new(), &())
        .unwrap();

    assert_eq!(assets.len(), 2);
    assert!(state.groups.is_empty());
}

#[test]
fn file_time_fallback_groups_copies_with_the_same_mtime() {
    let temp = TempDir::new().unwrap();
    let original = temp.child("IMG_0001.png");
    let copy = temp.child("IMG_0001 copy.png");
    let other = temp.child("IMG_0002.png");
    write_png(original.path(), 8, 6);
    write_png(copy.path(), 8, 6);
    write_png(other.path(), 8, 6);

    let taken = SystemTime::UNIX_EPOCH + Duration::from_secs(1_609_582_830);
    set_mtime(original.path(), taken);
    set_mtime(copy.path(), taken);
    set_mtime(other.path(), taken + Duration::from_secs(60));

    let config = DirectorySourceConfig {
        file_time_fallback: true,
        ..Default::default()
    };
    let assets = DirectorySource::new(vec![temp.path().to_path_buf()], config)
        .fetch_all()
        .unwrap();
    let state = DuplicateScanner::new()
        .scan(&assets, &CancelToken::new(), &())
        .unwrap();

    assert_eq!(state.groups.len(), 1);
    let group = &state.groups[0];
    assert!(predicate::str::ends_with("IMG_0001 copy.png")
        .eval(group.representative.id.as_str()));
    assert!(predicate::str::ends_with("IMG_0001.png").eval(group.members[0].id.as_str()));
}

#[test]
fn unreadable_images_are_skipped_with_an_event() {
    let temp = TempDir::new().unwrap();
    write_png(temp.child("good.png").path(), 4, 4);
    temp.child("corrupt.jpg")
        .write_str("this is not a valid image file")
        .unwrap();

    let (sender, receiver) = EventChannel::new();
    let assets = DirectorySource::new(vec![temp.path().to_path_buf()], Default::default())
        .fetch_with_events(&sender)
        .unwrap();
    drop(sender);

    assert_eq!(assets.len(), 1);
    let skipped: Vec<_> = receiver
        .iter()
        .filter_map(|e| match e {
            Event::Source(SourceEvent::Skipped { path, .. }) => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].ends_with("corrupt.jpg"));
}

#[test]
fn load_paths_combines_directories_and_manifests() {
    let temp = TempDir::new().unwrap();
    let photos = temp.child("photos");
    photos.create_dir_all().unwrap();
    write_png(photos.child("IMG_9999.png").path(), 4, 4);
    temp.child("library.json").write_str(MANIFEST).unwrap();

    let assets = load_paths(
        &[photos.path(), temp.child("library.json").path()],
        &DirectorySourceConfig::default(),
        &CancelToken::new(),
        &null_sender(),
    )
    .unwrap();

    assert_eq!(assets.len(), 5);
    // Known capture times sort first
    assert_eq!(assets[0].id.as_str(), "IMG_0001");
    assert!(assets[3..].iter().all(|a| a.creation_timestamp.is_none()));
}

#[test]
fn one_file_reached_through_two_spellings_is_not_its_own_duplicate() {
    let temp = TempDir::new().unwrap();
    let sub = temp.child("sub");
    sub.create_dir_all().unwrap();
    write_png(sub.child("a.png").path(), 4, 4);

    let config = DirectorySourceConfig {
        file_time_fallback: true,
        ..Default::default()
    };
    let dotted = sub.path().join(".");
    let assets = load_paths(
        &[sub.path(), dotted.as_path(), temp.path()],
        &config,
        &CancelToken::new(),
        &null_sender(),
    )
    .unwrap();

    assert_eq!(assets.len(), 1);
    assert!(predicate::str::contains("/./").not().eval(assets[0].id.as_str()));

    let state = DuplicateScanner::new()
        .scan(&assets, &CancelToken::new(), &())
        .unwrap();
    assert!(state.groups.is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let result = DirectorySource::new(
        vec!["/nonexistent/path/that/does/not/exist".into()],
        Default::default(),
    )
    .fetch_all();

    assert!(matches!(result, Err(SourceError::NotFound { .. })));
}
