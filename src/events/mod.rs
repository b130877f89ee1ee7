//! # Events Module
//!
//! Event-driven progress reporting for any front-end.
//!
//! ## Design
//! The core emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Match(MatchEvent::Progress(p)) = event {
//!             println!("{}/{} work files", p.processed, p.total);
//!         }
//!     }
//! });
//!
//! coordinator.run_with(&work_dir, &original_dir, &mut sink, &mut emitter, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
