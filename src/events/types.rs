//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the import pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Volume discovery events
    Locate(LocateEvent),
    /// Source enumeration events
    Scan(ScanEvent),
    /// Copy phase events
    Copy(CopyEvent),
    /// Verification phase events
    Verify(VerifyEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while locating the source volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LocateEvent {
    /// Probing mount patterns for the given label
    Started { label: String },
    /// A matching volume root was resolved
    Found { root: PathBuf },
}

/// Events during source enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Enumeration has started over these directories
    Started { roots: Vec<PathBuf> },
    /// A photo was found
    FileFound { path: PathBuf },
    /// A file could not be read and was skipped (non-fatal)
    Skipped { path: PathBuf, reason: String },
    /// Enumeration completed
    Completed { total_files: usize, total_bytes: u64 },
}

/// Per-file progress snapshot emitted after each completed copy.
///
/// `bytes_done` is cumulative across the batch, so a consumer can
/// render a single bytes-based bar without tracking state itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CopyProgress {
    /// Zero-based index of the file just finished
    pub file_index: usize,
    /// Bytes copied so far, including this file
    pub bytes_done: u64,
    /// Total bytes in the batch
    pub bytes_total: u64,
}

/// Events during the copy phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CopyEvent {
    /// Copying has started
    Started { total_files: usize, total_bytes: u64 },
    /// A file copy is beginning
    FileStarted { index: usize, path: PathBuf },
    /// A file finished copying
    FileFinished(CopyProgress),
    /// A file failed to copy; the batch continues
    FileFailed {
        index: usize,
        path: PathBuf,
        reason: String,
    },
    /// Copying completed
    Completed { copied: usize, failed: usize },
}

/// Events during the verification phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerifyEvent {
    /// Verification has started over the destination tree
    Started { path: PathBuf },
    /// Verification completed
    Completed { mismatches: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: ImportPhase },
    /// Pipeline completed
    Completed { summary: ImportSummary },
    /// Pipeline was cancelled between files
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the import pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportPhase {
    Locating,
    Scanning,
    Planning,
    Copying,
    Verifying,
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Files successfully copied
    pub files_copied: usize,
    /// Files that failed to copy
    pub files_failed: usize,
    /// Bytes written to the destination
    pub bytes_copied: u64,
    /// Verification outcome; None when verification was skipped
    pub verified: Option<bool>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportPhase::Locating => write!(f, "Locating volume"),
            ImportPhase::Scanning => write!(f, "Scanning"),
            ImportPhase::Planning => write!(f, "Resolving destination"),
            ImportPhase::Copying => write!(f, "Copying"),
            ImportPhase::Verifying => write!(f, "Verifying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Copy(CopyEvent::FileFinished(CopyProgress {
            file_index: 3,
            bytes_done: 12_000_000,
            bytes_total: 48_000_000,
        }));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Copy(CopyEvent::FileFinished(p)) => {
                assert_eq!(p.file_index, 3);
                assert_eq!(p.bytes_done, 12_000_000);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn import_summary_is_serializable() {
        let summary = ImportSummary {
            files_copied: 214,
            files_failed: 1,
            bytes_copied: 9_500_000_000,
            verified: Some(false),
            duration_ms: 83_000,
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("9500000000"));
    }
}
