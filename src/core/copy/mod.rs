//! # Copy Module
//!
//! Copies the scanned batch onto the destination, one file at a time.
//!
//! Files copy sequentially in record order, preserving each record's
//! relative path beneath the destination folder. A failed file is
//! recorded and the batch moves on; the one fatal condition is the
//! destination root itself disappearing (device unmounted), which
//! aborts with [`CopyError::DestinationLost`] rather than recreating
//! the root on whatever filesystem is left underneath.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::scanner::FileRecord;
use crate::error::CopyError;
use crate::events::{CopyEvent, CopyProgress, Event, EventSender};

/// Outcome of copying a single record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyResult {
    /// The record this result belongs to
    pub record: FileRecord,
    /// Whether the copy landed intact
    pub succeeded: bool,
    /// Failure description when `succeeded` is false
    pub error_detail: Option<String>,
}

/// Aggregate outcome of a copy batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyReport {
    /// Files actually tried (smaller than the batch when cancelled)
    pub total_attempted: usize,
    pub total_succeeded: usize,
    pub total_failed: usize,
    /// Bytes landed at the destination
    pub bytes_copied: u64,
    pub duration_ms: u64,
    /// True when a cancellation request stopped the batch early
    pub cancelled: bool,
    /// Per-file results in attempt order
    pub results: Vec<CopyResult>,
}

impl CopyReport {
    /// True when every record was attempted and succeeded
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.total_failed == 0
    }
}

/// Cooperative stop flag observed between files
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop at the next file boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Copies `records` beneath `final_path` in order.
///
/// Emits one [`CopyEvent::FileFinished`] progress tuple per successful
/// file, with `bytes_done` cumulative over the batch. Cancellation is
/// honored between files only, so the in-flight file either lands
/// whole or is removed; records not reached are not counted as
/// failures.
pub fn copy_files(
    records: &[FileRecord],
    final_path: &Path,
    events: &EventSender,
    cancel: &CancellationToken,
) -> Result<CopyReport, CopyError> {
    let start = Instant::now();
    let bytes_total: u64 = records.iter().map(|r| r.size_bytes).sum();

    events.send(Event::Copy(CopyEvent::Started {
        total_files: records.len(),
        total_bytes: bytes_total,
    }));

    let mut results: Vec<CopyResult> = Vec::new();
    let mut bytes_copied = 0u64;
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    let mut created_dirs: HashSet<PathBuf> = HashSet::new();
    let mut cancelled = false;

    for (index, record) in records.iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        // The destination root must outlive the batch; it is never recreated
        if !final_path.is_dir() {
            return Err(CopyError::DestinationLost {
                path: final_path.to_path_buf(),
            });
        }

        events.send(Event::Copy(CopyEvent::FileStarted {
            index,
            path: record.absolute_path.clone(),
        }));

        match copy_one(record, final_path, &mut claimed, &mut created_dirs) {
            Ok(()) => {
                bytes_copied += record.size_bytes;
                results.push(CopyResult {
                    record: record.clone(),
                    succeeded: true,
                    error_detail: None,
                });
                events.send(Event::Copy(CopyEvent::FileFinished(CopyProgress {
                    file_index: index,
                    bytes_done: bytes_copied,
                    bytes_total,
                })));
            }
            Err(reason) => {
                if !final_path.is_dir() {
                    return Err(CopyError::DestinationLost {
                        path: final_path.to_path_buf(),
                    });
                }

                events.send(Event::Copy(CopyEvent::FileFailed {
                    index,
                    path: record.absolute_path.clone(),
                    reason: reason.clone(),
                }));
                results.push(CopyResult {
                    record: record.clone(),
                    succeeded: false,
                    error_detail: Some(reason),
                });
            }
        }
    }

    let total_succeeded = results.iter().filter(|r| r.succeeded).count();
    let total_failed = results.len() - total_succeeded;

    events.send(Event::Copy(CopyEvent::Completed {
        copied: total_succeeded,
        failed: total_failed,
    }));

    Ok(CopyReport {
        total_attempted: results.len(),
        total_succeeded,
        total_failed,
        bytes_copied,
        duration_ms: start.elapsed().as_millis() as u64,
        cancelled,
        results,
    })
}

fn copy_one(
    record: &FileRecord,
    final_path: &Path,
    claimed: &mut HashSet<PathBuf>,
    created_dirs: &mut HashSet<PathBuf>,
) -> Result<(), String> {
    // Two records claiming the same destination would silently
    // overwrite each other; the later one fails instead
    if !claimed.insert(record.relative_path.clone()) {
        return Err(format!(
            "duplicate relative path {} within this batch",
            record.relative_path.display()
        ));
    }

    let dest = final_path.join(&record.relative_path);

    if let Some(parent) = dest.parent() {
        if !created_dirs.contains(parent) {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
            created_dirs.insert(parent.to_path_buf());
        }
    }

    // A source that fails to open must leave `dest` untouched
    let mut source = fs::File::open(&record.absolute_path)
        .map_err(|e| format!("failed to open {}: {}", record.absolute_path.display(), e))?;
    let mut target = fs::File::create(&dest)
        .map_err(|e| format!("failed to create {}: {}", dest.display(), e))?;

    if let Err(e) = io::copy(&mut source, &mut target) {
        // Never leave a partial file at the destination
        drop(target);
        let _ = fs::remove_file(&dest);
        return Err(e.to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{null_sender, EventChannel};
    use chrono::Utc;
    use tempfile::TempDir;

    fn record_for(source_root: &Path, relative: &str, bytes: usize) -> FileRecord {
        let absolute = source_root.join(relative);
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&absolute, vec![0xAB; bytes]).unwrap();
        FileRecord {
            relative_path: PathBuf::from(relative),
            absolute_path: absolute,
            size_bytes: bytes as u64,
            captured_at: Utc::now(),
        }
    }

    fn phantom_record(source_root: &Path, relative: &str) -> FileRecord {
        FileRecord {
            relative_path: PathBuf::from(relative),
            absolute_path: source_root.join(relative),
            size_bytes: 4,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn copies_batch_preserving_subpaths() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let records = vec![
            record_for(source.path(), "IMG_0001.jpg", 3),
            record_for(source.path(), "100CANON/IMG_0002.jpg", 5),
        ];

        let report =
            copy_files(&records, dest.path(), &null_sender(), &CancellationToken::new()).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.total_attempted, 2);
        assert_eq!(report.total_succeeded, 2);
        assert_eq!(report.bytes_copied, 8);
        assert!(dest.path().join("IMG_0001.jpg").is_file());
        assert!(dest.path().join("100CANON/IMG_0002.jpg").is_file());
        // Sources are untouched
        assert!(records[0].absolute_path.is_file());
    }

    #[test]
    fn failed_file_is_recorded_and_batch_continues() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let records = vec![
            phantom_record(source.path(), "IMG_0001.jpg"),
            record_for(source.path(), "IMG_0002.jpg", 6),
        ];

        let report =
            copy_files(&records, dest.path(), &null_sender(), &CancellationToken::new()).unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.total_attempted, 2);
        assert_eq!(report.total_failed, 1);
        assert_eq!(report.total_succeeded, 1);
        assert!(!report.results[0].succeeded);
        assert!(report.results[0].error_detail.is_some());
        assert!(!dest.path().join("IMG_0001.jpg").exists());
        assert!(dest.path().join("IMG_0002.jpg").is_file());
    }

    #[test]
    fn duplicate_relative_path_fails_instead_of_overwriting() {
        let source_a = TempDir::new().unwrap();
        let source_b = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let first = record_for(source_a.path(), "IMG_0001.jpg", 3);
        let second = record_for(source_b.path(), "IMG_0001.jpg", 9);

        let report = copy_files(
            &[first, second],
            dest.path(),
            &null_sender(),
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(report.total_succeeded, 1);
        assert_eq!(report.total_failed, 1);
        let detail = report.results[1].error_detail.as_deref().unwrap();
        assert!(detail.contains("duplicate relative path"));
        // First writer wins
        assert_eq!(fs::read(dest.path().join("IMG_0001.jpg")).unwrap().len(), 3);
    }

    #[test]
    fn cancellation_stops_before_the_next_file() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let records = vec![record_for(source.path(), "IMG_0001.jpg", 3)];

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = copy_files(&records, dest.path(), &null_sender(), &cancel).unwrap();

        assert!(report.cancelled);
        assert!(!report.is_complete());
        assert_eq!(report.total_attempted, 0);
        assert_eq!(report.total_failed, 0);
        assert!(!dest.path().join("IMG_0001.jpg").exists());
    }

    #[test]
    fn vanished_destination_root_is_fatal() {
        let source = TempDir::new().unwrap();
        let records = vec![record_for(source.path(), "IMG_0001.jpg", 3)];

        let dest = TempDir::new().unwrap();
        let final_path = dest.path().join("2024-01-05_ski_trip");
        // Root was never created, as if the drive vanished after planning
        let err = copy_files(&records, &final_path, &null_sender(), &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, CopyError::DestinationLost { .. }));
        assert!(!final_path.exists());
    }

    #[test]
    fn blocked_destination_path_fails_without_replacing_it() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let records = vec![record_for(source.path(), "IMG_0001.jpg", 3)];
        fs::create_dir(dest.path().join("IMG_0001.jpg")).unwrap();

        let report =
            copy_files(&records, dest.path(), &null_sender(), &CancellationToken::new()).unwrap();

        assert_eq!(report.total_failed, 1);
        assert!(dest.path().join("IMG_0001.jpg").is_dir());
    }

    #[test]
    fn unreadable_source_leaves_an_existing_destination_file_intact() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        // Landed by an earlier run; this run's record points at a
        // source that no longer opens
        fs::write(dest.path().join("IMG_0001.jpg"), vec![0xCD; 1024]).unwrap();
        let records = vec![phantom_record(source.path(), "IMG_0001.jpg")];

        let report =
            copy_files(&records, dest.path(), &null_sender(), &CancellationToken::new()).unwrap();

        assert_eq!(report.total_failed, 1);
        assert_eq!(
            fs::read(dest.path().join("IMG_0001.jpg")).unwrap(),
            vec![0xCD; 1024]
        );
    }

    #[test]
    fn progress_events_accumulate_bytes() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let records = vec![
            record_for(source.path(), "IMG_0001.jpg", 3),
            record_for(source.path(), "IMG_0002.jpg", 5),
        ];

        let (sender, receiver) = EventChannel::new();
        copy_files(&records, dest.path(), &sender, &CancellationToken::new()).unwrap();
        drop(sender);

        let progress: Vec<CopyProgress> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Copy(CopyEvent::FileFinished(p)) => Some(p),
                _ => None,
            })
            .collect();

        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].file_index, 0);
        assert_eq!(progress[0].bytes_done, 3);
        assert_eq!(progress[0].bytes_total, 8);
        assert_eq!(progress[1].file_index, 1);
        assert_eq!(progress[1].bytes_done, 8);
        assert_eq!(progress[1].bytes_total, 8);
    }
}
