//! # Error Module
//!
//! User-friendly error types for the duplicate asset finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, asset ids, what went wrong
//! - **Cancellation is not an error** - a stopped scan is a normal result
//!   (`ScanState::cancelled`), never a variant here

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DuplicateFinderError {
    #[error("Asset source error: {0}")]
    Source(#[from] SourceError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while enumerating assets
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid asset manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },
}

/// Errors that prevent a duplicate scan from running
#[derive(Error, Debug)]
pub enum ScanError {
    /// The input broke the unique-identity precondition. The scan is
    /// rejected before any work is done.
    #[error("Asset id {id} appears more than once in the input; ids must be unique")]
    DuplicateIdentity { id: String },

    #[error("A scan is already in progress")]
    AlreadyRunning,

    #[error("The scan worker thread panicked")]
    WorkerPanicked,
}

/// Errors that occur while writing reports
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    SerializationFailed(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DuplicateFinderError>;
