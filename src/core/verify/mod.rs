//! # Verify Module
//!
//! Checks the destination against the source enumeration after a copy.
//!
//! The destination is re-enumerated with the same extension filter the
//! scanner used, then compared per relative path on size. Timestamps
//! are never compared; copying does not promise to preserve them.
//! Verification reads both trees and writes nothing.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::scanner::{enumerate, ExtensionFilter, FileRecord};
use crate::error::ScanError;
use crate::events::null_sender;

/// A single discrepancy between source and destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Mismatch {
    /// A source file has no counterpart at the destination
    Missing {
        relative_path: PathBuf,
        expected_size: u64,
    },
    /// The destination copy has a different size
    SizeDiffers {
        relative_path: PathBuf,
        expected_size: u64,
        actual_size: u64,
    },
    /// The destination holds a photo the source never had
    Unexpected {
        relative_path: PathBuf,
        actual_size: u64,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Missing {
                relative_path,
                expected_size,
            } => write!(
                f,
                "missing {} ({} bytes expected)",
                relative_path.display(),
                expected_size
            ),
            Mismatch::SizeDiffers {
                relative_path,
                expected_size,
                actual_size,
            } => write!(
                f,
                "size differs for {}: expected {} bytes, found {}",
                relative_path.display(),
                expected_size,
                actual_size
            ),
            Mismatch::Unexpected {
                relative_path,
                actual_size,
            } => write!(
                f,
                "unexpected {} ({} bytes)",
                relative_path.display(),
                actual_size
            ),
        }
    }
}

/// Outcome of comparing destination against source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub source_file_count: usize,
    pub dest_file_count: usize,
    pub source_total_bytes: u64,
    pub dest_total_bytes: u64,
    /// Source-order mismatches first, then destination orphans
    pub mismatches: Vec<Mismatch>,
}

impl VerificationReport {
    /// True when the destination mirrors the source exactly.
    ///
    /// The count and byte comparisons are not redundant: two source
    /// records sharing a relative path can leave the per-file list
    /// empty while a file is still missing.
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
            && self.source_file_count == self.dest_file_count
            && self.source_total_bytes == self.dest_total_bytes
    }
}

/// Compares the copied tree at `final_path` against `source_records`.
pub fn verify(
    source_records: &[FileRecord],
    final_path: &Path,
    filter: &ExtensionFilter,
) -> Result<VerificationReport, ScanError> {
    let dest = enumerate(&[final_path.to_path_buf()], filter, &null_sender())?;

    let dest_sizes: HashMap<&Path, u64> = dest
        .records
        .iter()
        .map(|r| (r.relative_path.as_path(), r.size_bytes))
        .collect();

    let mut mismatches = Vec::new();

    for record in source_records {
        match dest_sizes.get(record.relative_path.as_path()) {
            None => mismatches.push(Mismatch::Missing {
                relative_path: record.relative_path.clone(),
                expected_size: record.size_bytes,
            }),
            Some(&actual_size) if actual_size != record.size_bytes => {
                mismatches.push(Mismatch::SizeDiffers {
                    relative_path: record.relative_path.clone(),
                    expected_size: record.size_bytes,
                    actual_size,
                });
            }
            Some(_) => {}
        }
    }

    let source_paths: HashSet<&Path> = source_records
        .iter()
        .map(|r| r.relative_path.as_path())
        .collect();

    for record in &dest.records {
        if !source_paths.contains(record.relative_path.as_path()) {
            mismatches.push(Mismatch::Unexpected {
                relative_path: record.relative_path.clone(),
                actual_size: record.size_bytes,
            });
        }
    }

    Ok(VerificationReport {
        source_file_count: source_records.len(),
        dest_file_count: dest.records.len(),
        source_total_bytes: source_records.iter().map(|r| r.size_bytes).sum(),
        dest_total_bytes: dest.total_bytes(),
        mismatches,
    })
}
