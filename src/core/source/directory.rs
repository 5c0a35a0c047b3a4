//! Directory walking source using walkdir.

use super::filter::{is_hidden, ImageFilter};
use super::metadata::{variant_from_filename, CaptureMetadata};
use super::{sort_by_creation, AssetSource};
use crate::core::asset::Asset;
use crate::core::scanner::CancelToken;
use crate::error::SourceError;
use crate::events::{null_sender, Event, EventSender, SourceEvent};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory source
#[derive(Debug, Clone, Default)]
pub struct DirectorySourceConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
    /// Use the file's modification time when EXIF has no capture time.
    ///
    /// Off by default: copies made without preserving times would never
    /// match, and unrelated files touched together would.
    pub file_time_fallback: bool,
}

/// Enumerates image files under one or more directories
pub struct DirectorySource {
    roots: Vec<PathBuf>,
    config: DirectorySourceConfig,
    filter: ImageFilter,
    cancel: CancelToken,
}

impl DirectorySource {
    pub fn new(roots: Vec<PathBuf>, config: DirectorySourceConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self {
            roots,
            config,
            filter,
            cancel: CancelToken::new(),
        }
    }

    /// Stop enumerating once `cancel` fires; files not yet read are left out
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Enumerate with progress reporting via events
    pub fn fetch_with_events(&self, events: &EventSender) -> Result<Vec<Asset>, SourceError> {
        events.send(Event::Source(SourceEvent::Started {
            paths: self.roots.clone(),
        }));

        let mut files = Vec::new();
        for root in &self.roots {
            if self.cancel.is_cancelled() {
                break;
            }
            files.extend(self.collect_files(root, events)?);
        }

        // Metadata reads dominate; spread them over all cores
        let results: Vec<Result<Asset, (PathBuf, String)>> = files
            .par_iter()
            .filter(|_| !self.cancel.is_cancelled())
            .map(|path| self.read_asset(path))
            .collect();

        if self.cancel.is_cancelled() {
            debug!(found = results.len(), total = files.len(), "Enumeration cancelled");
        }

        let mut assets = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(asset) => assets.push(asset),
                Err((path, message)) => {
                    warn!(path = %path.display(), %message, "Skipping file");
                    events.send(Event::Source(SourceEvent::Skipped { path, message }));
                }
            }
        }

        sort_by_creation(&mut assets);

        events.send(Event::Source(SourceEvent::Completed {
            total_assets: assets.len(),
        }));

        Ok(assets)
    }

    /// Walk one root and return the image files under it
    fn collect_files(&self, root: &Path, events: &EventSender) -> Result<Vec<PathBuf>, SourceError> {
        if !root.is_dir() {
            return Err(SourceError::NotFound {
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;
        let mut files = Vec::new();

        // Hidden directories are pruned entirely, not just their files
        let entries = walker
            .into_iter()
            .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e.path()));

        for entry_result in entries {
            if self.cancel.is_cancelled() {
                break;
            }
            match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        debug!(path = %entry.path().display(), "Walking directory");
                        continue;
                    }
                    if self.filter.should_include(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!(path = %path.display(), error = %e, "Unreadable directory entry");
                    events.send(Event::Source(SourceEvent::Skipped {
                        path,
                        message: e.to_string(),
                    }));
                }
            }
        }

        Ok(files)
    }

    fn read_asset(&self, path: &Path) -> Result<Asset, (PathBuf, String)> {
        let metadata = CaptureMetadata::read(path);

        let Some((width, height)) = metadata.dimensions() else {
            return Err((path.to_path_buf(), "could not determine image dimensions".to_string()));
        };

        let taken = metadata.date_taken.or_else(|| {
            self.config
                .file_time_fallback
                .then(|| file_modified(path))
                .flatten()
        });

        // One file reached through two spellings must keep one identity
        let location = fs::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();
        Ok(Asset::new(location.clone(), taken, width, height)
            .with_variant(variant_from_filename(path))
            .with_location(location))
    }
}

impl AssetSource for DirectorySource {
    fn fetch_all(&self) -> Result<Vec<Asset>, SourceError> {
        self.fetch_with_events(&null_sender())
    }
}

fn file_modified(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}
