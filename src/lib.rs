//! # Duplicate Asset Finder
//!
//! Finds photos that are likely duplicates of one another by comparing
//! their capture metadata: capture time, encoding variant and dimensions.
//!
//! ## Core Philosophy
//! - **Never delete** - the finder only flags candidates
//! - **Precision over recall** - exact metadata equality, and a missing
//!   capture time never matches anything
//! - **Stoppable** - a long scan can be cancelled and keeps what it found
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Assets, the matcher, the scanner, sources and reporting
//! - `events` - Progress reporting through sinks and channels
//! - `error` - User-friendly error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DuplicateFinderError, Result};

/// Initialize tracing for the library
///
/// Honours `RUST_LOG`; `default_directive` applies when it is unset.
/// Safe to call more than once: later calls are ignored.
pub fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
