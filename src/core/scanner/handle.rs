//! Background execution of scans.

use super::{CancelToken, DuplicateScanner, ScanState};
use crate::core::asset::Asset;
use crate::error::ScanError;
use crate::events::ProgressSink;
use std::sync::{Mutex, MutexGuard};
use std::thread::JoinHandle;
use tracing::debug;

/// A scan running on its own thread
pub struct ScanHandle {
    cancel: CancelToken,
    worker: JoinHandle<Result<ScanState, ScanError>>,
}

impl ScanHandle {
    pub(crate) fn new(
        cancel: CancelToken,
        worker: JoinHandle<Result<ScanState, ScanError>>,
    ) -> Self {
        Self { cancel, worker }
    }

    /// Token that stops this scan; can be handed to other threads
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Ask the scan to stop at its next check point
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the scan loop has exited
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the scan and take its final state
    pub fn join(self) -> Result<ScanState, ScanError> {
        self.worker.join().map_err(|_| ScanError::WorkerPanicked)?
    }
}

/// Runs at most one scan at a time.
///
/// Mirrors a start/stop button pair: `start` is refused while a scan is in
/// flight, `stop` requests cancellation, and `wait` collects the result.
pub struct ScanController {
    scanner: DuplicateScanner,
    active: Mutex<Option<ScanHandle>>,
}

impl ScanController {
    pub fn new(scanner: DuplicateScanner) -> Self {
        Self {
            scanner,
            active: Mutex::new(None),
        }
    }

    /// Start a scan in the background.
    ///
    /// A finished scan whose result was never collected is discarded; each
    /// scan starts from a fresh state.
    pub fn start<S>(&self, assets: Vec<Asset>, progress: S) -> Result<CancelToken, ScanError>
    where
        S: ProgressSink + 'static,
    {
        let mut active = self.active();

        if let Some(handle) = active.as_ref() {
            if !handle.is_finished() {
                return Err(ScanError::AlreadyRunning);
            }
            debug!("Discarding uncollected result of previous scan");
        }

        let handle = self.scanner.spawn(assets, CancelToken::new(), progress);
        let token = handle.cancel_token();
        *active = Some(handle);
        Ok(token)
    }

    /// Request the running scan to stop. Returns false if none is running.
    pub fn stop(&self) -> bool {
        match self.active().as_ref() {
            Some(handle) if !handle.is_finished() => {
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Block until the current scan ends and take its result.
    ///
    /// Returns `None` if no scan was started since the last `wait`.
    pub fn wait(&self) -> Option<Result<ScanState, ScanError>> {
        let handle = self.active().take()?;
        Some(handle.join())
    }

    fn active(&self) -> MutexGuard<'_, Option<ScanHandle>> {
        // The guarded value is just a handle; a panic elsewhere cannot
        // leave it half-updated.
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ScanController {
    fn default() -> Self {
        Self::new(DuplicateScanner::new())
    }
}
