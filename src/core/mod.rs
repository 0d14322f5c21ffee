//! # Core Module
//!
//! The UI-agnostic import engine.
//!
//! ## Modules
//! - `volume` - Locates the mounted camera card by label
//! - `scanner` - Enumerates photo files on the card
//! - `plan` - Resolves the destination folder layout
//! - `copy` - Copies the batch, one file at a time
//! - `verify` - Compares the destination against the source
//! - `pipeline` - Orchestrates the full workflow

pub mod copy;
pub mod pipeline;
pub mod plan;
pub mod scanner;
pub mod verify;
pub mod volume;

// Re-export commonly used types
pub use copy::{CancellationToken, CopyReport, CopyResult};
pub use pipeline::{ImportOutcome, ImportPipeline};
pub use plan::DestinationPlan;
pub use scanner::{FileRecord, ScanResult};
pub use verify::{Mismatch, VerificationReport};
pub use volume::{GlobVolumeProvider, VolumeHandle, VolumeProvider};
