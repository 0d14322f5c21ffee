//! File filtering logic for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Filters walked files down to the configured photo extensions
pub struct ExtensionFilter {
    /// Extensions to include, lowercase and without a leading dot
    extensions: HashSet<String>,
}

impl ExtensionFilter {
    /// Builds a filter from configured extension entries.
    ///
    /// Entries match case-insensitively and may be written with or
    /// without a leading dot (`jpg`, `.JPG` and `Jpg` are equivalent).
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        // Hidden files never import
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }
}
