//! # Volume Module
//!
//! Finds the mounted camera card among candidate mount points.
//!
//! ## Design
//! Mount layouts are platform-specific, so pattern expansion sits
//! behind the [`VolumeProvider`] trait: the production implementation
//! asks the real filesystem, while tests substitute a fake serving a
//! fixed list of roots. The label-matching logic in
//! [`locate_volume`] is identical either way.

mod locator;

pub use locator::{locate_volume, render_pattern};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::VolumeError;

/// The resolved source filesystem root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeHandle {
    /// Root directory of the located volume
    pub root_path: PathBuf,
    /// Label the volume was matched against
    pub label: String,
}

/// Lists candidate volume roots for one rendered mount pattern.
pub trait VolumeProvider: Send + Sync {
    /// Expand `pattern` to the existing directories it matches, in
    /// lexicographic order.
    fn candidate_roots(&self, pattern: &str) -> Result<Vec<PathBuf>, VolumeError>;
}

/// Provider that expands glob patterns against the real filesystem
pub struct GlobVolumeProvider;

impl VolumeProvider for GlobVolumeProvider {
    fn candidate_roots(&self, pattern: &str) -> Result<Vec<PathBuf>, VolumeError> {
        let entries = glob::glob(pattern).map_err(|e| VolumeError::BadPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let mut roots: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_dir())
            .collect();
        roots.sort();
        Ok(roots)
    }
}
