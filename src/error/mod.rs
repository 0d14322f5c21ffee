//! # Error Module
//!
//! Error types for the photo import pipeline.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, labels, what went wrong
//! - **Abort before damage** - structural failures surface before any
//!   file is written; per-file copy failures are captured in the copy
//!   report instead of being raised
//! - **Recovery hints** - suggest how to fix when possible

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Volume error: {0}")]
    Volume(#[from] VolumeError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Destination error: {0}")]
    Plan(#[from] PlanError),

    #[error("Copy error: {0}")]
    Copy(#[from] CopyError),
}

/// Errors from loading or validating the configuration document
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write default configuration to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No configuration directory available on this system")]
    NoConfigDir,

    #[error("No home directory available to derive the destination from")]
    NoHomeDir,
}

/// Errors that occur while locating the source volume
#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("No volume labeled '{label}' found. Probed patterns: {}", patterns.join(", "))]
    NotFound { label: String, patterns: Vec<String> },

    #[error(
        "Volume label '{label}' is ambiguous; matches: {}. Unplug one device or narrow the mount patterns.",
        join_paths(candidates)
    )]
    Ambiguous {
        label: String,
        candidates: Vec<PathBuf>,
    },

    #[error("Invalid mount pattern '{pattern}': {reason}")]
    BadPattern { pattern: String, reason: String },
}

/// Errors that occur during file enumeration
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read volume directory {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid source pattern '{pattern}': {reason}")]
    BadPattern { pattern: String, reason: String },
}

/// Errors from resolving or preparing the destination
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("No photos matched the configured extensions; nothing to copy")]
    NoSourceFiles,

    #[error("Destination {path} already exists and is not empty. Pass --allow-existing to merge into it.")]
    Exists { path: PathBuf },

    #[error("Cannot create destination {path}: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal copy-stage errors (individual file failures are reported, not raised)
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Destination {path} disappeared mid-run; aborting the batch")]
    DestinationLost { path: PathBuf },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ImportError>;

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
