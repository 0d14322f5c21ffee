//! # Pipeline Module
//!
//! Orchestrates the full import workflow.
//!
//! ## Pipeline Stages
//! 1. **Locate** - Find the mounted card by volume label
//! 2. **Scan** - Enumerate photos beneath the source patterns
//! 3. **Plan** - Resolve and create the destination layout
//! 4. **Copy** - Copy files sequentially, preserving subpaths
//! 5. **Verify** - Compare the destination against the source
//!
//! Verification is on by default and can be switched off per run.

mod executor;

pub use executor::{ImportOutcome, ImportPipeline, ImportPipelineBuilder};
pub use crate::core::copy::CancellationToken;
