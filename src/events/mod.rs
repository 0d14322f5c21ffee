//! # Events Module
//!
//! Progress reporting for the import pipeline.
//!
//! ## Design
//! The core library emits events through a channel; the consumer (the
//! CLI progress bar, or any other frontend) subscribes on its own
//! thread. Events are observational only - dropping the receiver never
//! stalls the pipeline.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Copy(CopyEvent::FileFinished(p)) = event {
//!             println!("{}/{} bytes", p.bytes_done, p.bytes_total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
