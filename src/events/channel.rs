//! Channel transport for scan and source events.
//!
//! A scan thread sends; a UI thread drains. Sending never blocks, so a
//! slow or absent consumer cannot stall the scan loop.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Producer half, handed to sources and scans. Cheap to clone.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Queue an event. Dropped silently once the receiver is gone.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Consumer half. Iteration ends when every sender has been dropped.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once all senders are gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructor for linked sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    /// Unbounded pair
    pub fn new() -> (EventSender, EventReceiver) {
        let (inner_tx, inner_rx) = unbounded();
        (EventSender { inner: inner_tx }, EventReceiver { inner: inner_rx })
    }
}

/// Sender whose receiver is already gone, for callers that want no events
pub fn null_sender() -> EventSender {
    EventChannel::new().0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ScanEvent, ScanProgress};
    use std::thread;

    fn progress(processed: usize) -> Event {
        Event::Scan(ScanEvent::Progress(ScanProgress {
            processed,
            total: 10,
            groups_found: 0,
        }))
    }

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(progress(5));
        });

        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Scan(ScanEvent::Progress(p)) => assert_eq!(p.processed, 5),
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Scan(ScanEvent::Started { total_assets: 3 }));
    }

    #[test]
    fn iteration_ends_when_all_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        let second = sender.clone();

        sender.send(progress(1));
        second.send(progress(2));
        drop(sender);
        drop(second);

        let processed: Vec<usize> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Scan(ScanEvent::Progress(p)) => Some(p.processed),
                _ => None,
            })
            .collect();
        assert_eq!(processed, vec![1, 2]);
        assert!(receiver.recv().is_none());
    }
}
