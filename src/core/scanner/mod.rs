//! # Scanner Module
//!
//! Enumerates photo files on the located volume.
//!
//! Scan roots come from the configured source patterns (`DCIM/*` by
//! default) expanded beneath the volume root; when nothing matches, the
//! volume root itself is scanned so a card with an unexpected layout
//! still imports. Every discovered file becomes an immutable
//! [`FileRecord`] carrying the subpath it will keep at the destination
//! and the best capture timestamp available.
//!
//! ## Example
//! ```rust,ignore
//! use photo_import::core::scanner::{enumerate, scan_roots, ExtensionFilter};
//!
//! let roots = scan_roots(&volume.root_path, &config.source_patterns)?;
//! let filter = ExtensionFilter::new(&config.photo_extensions);
//! let scan = enumerate(&roots, &filter, &events)?;
//! ```

mod capture;
mod filter;
mod walker;

pub use capture::capture_timestamp;
pub use filter::ExtensionFilter;
pub use walker::enumerate;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// A source file selected for import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the scan root that produced this record
    pub relative_path: PathBuf,
    /// Absolute path on the source volume
    pub absolute_path: PathBuf,
    /// File size in bytes
    pub size_bytes: u64,
    /// Best available capture time (EXIF, else filesystem)
    pub captured_at: DateTime<Utc>,
}

/// A file the scanner saw but could not read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of enumerating the scan roots
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Records in traversal order
    pub records: Vec<FileRecord>,
    /// Files skipped over read errors (non-fatal)
    pub skipped: Vec<SkippedFile>,
}

impl ScanResult {
    /// Total size of all discovered files in bytes
    pub fn total_bytes(&self) -> u64 {
        self.records.iter().map(|r| r.size_bytes).sum()
    }
}

/// Expands the configured source patterns beneath the volume root.
///
/// Patterns expand in list order, each expansion sorted
/// lexicographically, keeping directories only and dropping repeats.
/// When no pattern matches anything the volume root itself is the
/// single scan root.
pub fn scan_roots(volume_root: &Path, source_patterns: &[String]) -> Result<Vec<PathBuf>, ScanError> {
    let mut roots = Vec::new();

    for pattern in source_patterns {
        let full = volume_root.join(pattern);
        let full_str = full.to_str().ok_or_else(|| ScanError::BadPattern {
            pattern: pattern.clone(),
            reason: "pattern is not valid UTF-8".to_string(),
        })?;
        let entries = glob::glob(full_str).map_err(|e| ScanError::BadPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        let mut matched: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_dir())
            .collect();
        matched.sort();

        for path in matched {
            if !roots.contains(&path) {
                roots.push(path);
            }
        }
    }

    if roots.is_empty() {
        roots.push(volume_root.to_path_buf());
    }

    Ok(roots)
}
