//! # Configuration Module
//!
//! The on-disk configuration document: mount patterns, source-directory
//! patterns, accepted extensions, and the destination naming template.
//!
//! ## Behavior
//! - Missing file: defaults are written to disk and used.
//! - Missing fields: filled from defaults (the document can be partial).
//! - Malformed document or unknown template placeholder: fails fast
//!   with a configuration error before any filesystem scan begins.
//!
//! The loaded value is immutable and threaded into each pipeline stage
//! as a parameter; nothing reads configuration ambiently.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Placeholders recognized in `destination_template` and `subfolders`
pub const RECOGNIZED_PLACEHOLDERS: [&str; 3] = ["date", "project_name", "user"];

/// The resolved configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Mount-point patterns probed in order. `{user}` and `{label}` are
    /// substituted before glob expansion, so both literal paths and
    /// wildcard forms like `/media/*/EOS_DIGITAL` work.
    pub mount_patterns: Vec<String>,
    /// Globs expanded beneath the volume root to pick the directories
    /// to enumerate. Empty, or nothing matching: the volume root itself
    /// is enumerated.
    pub source_patterns: Vec<String>,
    /// Accepted file extensions, matched case-insensitively. A leading
    /// dot is tolerated.
    pub photo_extensions: Vec<String>,
    /// Folder-name template for the destination, e.g.
    /// `{date}_{project_name}`. `{date}` renders as the ISO date of the
    /// earliest capture timestamp.
    pub destination_template: String,
    /// Where dated folders are created. Defaults to `~/Photos`.
    pub destination_root: Option<PathBuf>,
    /// Subfolder skeleton created inside the destination folder. Each
    /// segment is itself a template.
    pub subfolders: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            mount_patterns: vec![
                "/media/{user}/{label}".to_string(),
                "/run/media/{user}/{label}".to_string(),
            ],
            source_patterns: vec!["DCIM/*".to_string()],
            photo_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "cr2".to_string(),
                "raw".to_string(),
            ],
            destination_template: "{date}_{project_name}".to_string(),
            destination_root: None,
            subfolders: vec!["selected".to_string(), "selected/exported".to_string()],
        }
    }
}

impl ImportConfig {
    /// Standard location of the configuration document
    /// (`~/.config/photo-import/config.json` on Linux).
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("photo-import").join("config.json"))
    }

    /// Load the document at `path`, creating it with defaults when it
    /// does not exist yet.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.write_to(path)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate(path)?;
        Ok(config)
    }

    /// Persist this configuration as pretty-printed JSON.
    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let raw = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, raw).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check structural requirements the type system cannot express.
    pub fn validate(&self, origin: &Path) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            path: origin.to_path_buf(),
            reason,
        };

        if self.mount_patterns.is_empty() {
            return Err(invalid("mount_patterns must not be empty".to_string()));
        }
        if self.photo_extensions.is_empty() {
            return Err(invalid("photo_extensions must not be empty".to_string()));
        }
        if self.photo_extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
            return Err(invalid("photo_extensions contains an empty entry".to_string()));
        }

        for template in
            std::iter::once(self.destination_template.as_str()).chain(self.subfolders.iter().map(String::as_str))
        {
            if let Some(token) = unknown_placeholder(template) {
                return Err(invalid(format!(
                    "unknown placeholder {{{token}}} in template '{template}'"
                )));
            }
        }

        Ok(())
    }

    /// The directory dated folders are created under.
    pub fn destination_base(&self) -> Result<PathBuf, ConfigError> {
        match &self.destination_root {
            Some(root) => Ok(root.clone()),
            None => {
                let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
                Ok(home.join("Photos"))
            }
        }
    }
}

/// Returns the first `{...}` token not in [`RECOGNIZED_PLACEHOLDERS`],
/// or the literal `{` for an unclosed brace.
fn unknown_placeholder(template: &str) -> Option<String> {
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            // Unclosed brace: surface the remainder as the bad token
            return Some(after.to_string());
        };
        let token = &after[..end];
        if !RECOGNIZED_PLACEHOLDERS.contains(&token) {
            return Some(token.to_string());
        }
        rest = &after[end + 1..];
    }
    None
}
