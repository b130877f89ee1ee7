//! # Duplicate File Matcher
//!
//! Finds duplicates between a "work" folder (suspected duplicates) and an
//! "original" folder (authoritative copies) using tolerant, multi-criteria
//! comparison instead of strict byte identity.
//!
//! ## Core Philosophy
//! - **Dry run by default** - nothing is touched unless explicitly executed
//! - **Show WHY** - every decision carries a rationale and its warnings
//! - **Warnings stop destructive actions** - unless the user neglects them
//!
//! ## Architecture
//! - `core` - The matching and decision engine (I/O-light, testable in memory)
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `"warn"`) is used.
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
