//! Directory walking implementation using walkdir.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{capture, ExtensionFilter, FileRecord, ScanResult, SkippedFile};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};

/// Enumerates photo files beneath the given scan roots.
///
/// Roots walk depth-first in the order given, entries sorted by name so
/// record order is stable across runs. A file that cannot be read
/// becomes a [`SkippedFile`] and the walk continues; only a root that
/// is itself missing or unreadable aborts the scan. An empty result is
/// valid.
pub fn enumerate(
    roots: &[PathBuf],
    filter: &ExtensionFilter,
    events: &EventSender,
) -> Result<ScanResult, ScanError> {
    events.send(Event::Scan(ScanEvent::Started {
        roots: roots.to_vec(),
    }));

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for root in roots {
        walk_root(root, filter, events, &mut records, &mut skipped)?;
    }

    let total_bytes = records.iter().map(|r| r.size_bytes).sum();
    events.send(Event::Scan(ScanEvent::Completed {
        total_files: records.len(),
        total_bytes,
    }));

    Ok(ScanResult { records, skipped })
}

fn walk_root(
    root: &Path,
    filter: &ExtensionFilter,
    events: &EventSender,
    records: &mut Vec<FileRecord>,
    skipped: &mut Vec<SkippedFile>,
) -> Result<(), ScanError> {
    let root_meta = fs::metadata(root).map_err(|e| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source: e,
    })?;
    if !root_meta.is_dir() {
        return Err(ScanError::RootUnreadable {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        });
    }

    for entry_result in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        match entry_result {
            Ok(entry) => {
                if entry.file_type().is_dir() {
                    continue;
                }

                let path = entry.path();
                if !filter.should_include(path) {
                    continue;
                }

                match fs::metadata(path) {
                    Ok(metadata) => {
                        let relative_path =
                            path.strip_prefix(root).unwrap_or(path).to_path_buf();

                        events.send(Event::Scan(ScanEvent::FileFound {
                            path: path.to_path_buf(),
                        }));

                        records.push(FileRecord {
                            relative_path,
                            absolute_path: path.to_path_buf(),
                            size_bytes: metadata.len(),
                            captured_at: capture::capture_timestamp(path, &metadata),
                        });
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        events.send(Event::Scan(ScanEvent::Skipped {
                            path: path.to_path_buf(),
                            reason: reason.clone(),
                        }));
                        skipped.push(SkippedFile {
                            path: path.to_path_buf(),
                            reason,
                        });
                    }
                }
            }
            Err(e) => {
                // A root that stats as a directory can still refuse to
                // list; that failure is the root's, not an entry's
                if e.path() == Some(root) {
                    return Err(ScanError::RootUnreadable {
                        path: root.to_path_buf(),
                        source: e.into_io_error().unwrap_or_else(|| {
                            std::io::Error::new(std::io::ErrorKind::Other, "unreadable")
                        }),
                    });
                }
                // Within the root, an unreadable entry skips, never aborts
                let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                let reason = e.to_string();
                events.send(Event::Scan(ScanEvent::Skipped {
                    path: path.clone(),
                    reason: reason.clone(),
                }));
                skipped.push(SkippedFile { path, reason });
            }
        }
    }

    Ok(())
}
