//! # Events Module
//!
//! Event-driven progress reporting that keeps the scanner free of any UI
//! dependency.
//!
//! ## Design
//! The scanner reports through the [`ProgressSink`] trait. An
//! [`EventSender`] is a sink that forwards everything onto a channel,
//! so any UI (CLI, GUI, web) can subscribe from its own thread.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Scan(ScanEvent::Progress(p)) = event {
//!             println!("{} of {} ({} groups)", p.processed, p.total, p.groups_found);
//!         }
//!     }
//! });
//!
//! let state = scanner.scan(&assets, &CancelToken::new(), &sender)?;
//! ```

mod channel;
mod sink;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use sink::ProgressSink;
pub use types::*;
