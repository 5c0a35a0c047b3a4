//! The progress callback contract between the scanner and its caller.

use super::{Event, EventSender, ScanEvent, ScanProgress, ScanSummary};

/// Receives progress notifications from a running scan.
///
/// Every method is called on the scan's own thread and must return
/// promptly. Marshaling onto a UI thread is the implementor's job; the
/// scanner never waits for a notification to be consumed.
pub trait ProgressSink: Send + Sync {
    /// Called once before the first asset is examined.
    fn on_started(&self, _total: usize) {}

    /// Called after each outer asset is fully examined. `processed` is
    /// strictly increasing and never exceeds `total`.
    fn on_progress(&self, processed: usize, total: usize, group_count: usize);

    /// Called once when the scan loop exits, whether it completed or was
    /// cancelled. Carries the true final counts.
    fn on_finished(&self, _summary: &ScanSummary) {}
}

/// Plain closures work as sinks for progress ticks.
impl<F> ProgressSink for F
where
    F: Fn(usize, usize, usize) + Send + Sync,
{
    fn on_progress(&self, processed: usize, total: usize, group_count: usize) {
        self(processed, total, group_count)
    }
}

/// `()` discards all progress.
impl ProgressSink for () {
    fn on_progress(&self, _processed: usize, _total: usize, _group_count: usize) {}
}

impl ProgressSink for EventSender {
    fn on_started(&self, total: usize) {
        self.send(Event::Scan(ScanEvent::Started {
            total_assets: total,
        }));
    }

    fn on_progress(&self, processed: usize, total: usize, group_count: usize) {
        self.send(Event::Scan(ScanEvent::Progress(ScanProgress {
            processed,
            total,
            groups_found: group_count,
        })));
    }

    fn on_finished(&self, summary: &ScanSummary) {
        let event = if summary.cancelled {
            ScanEvent::Cancelled {
                summary: summary.clone(),
            }
        } else {
            ScanEvent::Completed {
                summary: summary.clone(),
            }
        };
        self.send(Event::Scan(event));
    }
}
