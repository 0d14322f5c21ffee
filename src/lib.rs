//! # Photo Import
//!
//! Copies a day's shoot from a mounted camera card into a dated project
//! folder, then proves the copy is complete before the card is wiped.
//!
//! ## Core Philosophy
//! - **Never touch the source** - The card is read, never written
//! - **Fail loudly** - A file that did not land intact is reported, not papered over
//! - **Verify before wipe** - Count and size checks run before anyone formats the card
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Locate, scan, plan, copy and verify stages
//! - `config` - The on-disk configuration document
//! - `events` - Event-driven progress reporting
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ImportError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
