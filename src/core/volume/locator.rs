//! Label matching across rendered mount patterns.

use std::ffi::OsStr;
use std::path::PathBuf;

use tracing::debug;

use super::{VolumeHandle, VolumeProvider};
use crate::error::VolumeError;

/// Substitutes `{user}` and `{label}` into a mount pattern.
pub fn render_pattern(pattern: &str, label: &str, user: &str) -> String {
    pattern.replace("{label}", label).replace("{user}", user)
}

/// Locates the volume named `label` by expanding each mount pattern in
/// order and keeping the directories whose final path component equals
/// the label.
///
/// Identical paths matched by more than one pattern count once. Zero
/// distinct matches is [`VolumeError::NotFound`]; two or more is
/// [`VolumeError::Ambiguous`] so the caller never guesses between
/// simultaneously mounted cards.
pub fn locate_volume(
    provider: &dyn VolumeProvider,
    patterns: &[String],
    label: &str,
    user: &str,
) -> Result<VolumeHandle, VolumeError> {
    let mut matches: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let rendered = render_pattern(pattern, label, user);
        debug!(pattern = %rendered, "probing mount pattern");

        for root in provider.candidate_roots(&rendered)? {
            let name_matches = root
                .file_name()
                .map(|name| name == OsStr::new(label))
                .unwrap_or(false);
            if name_matches && !matches.contains(&root) {
                matches.push(root);
            }
        }
    }

    match matches.len() {
        0 => Err(VolumeError::NotFound {
            label: label.to_string(),
            patterns: patterns.to_vec(),
        }),
        1 => Ok(VolumeHandle {
            root_path: matches.remove(0),
            label: label.to_string(),
        }),
        _ => Err(VolumeError::Ambiguous {
            label: label.to_string(),
            candidates: matches,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves a fixed list of roots regardless of the pattern asked for.
    struct FixedRoots(Vec<PathBuf>);

    impl VolumeProvider for FixedRoots {
        fn candidate_roots(&self, _pattern: &str) -> Result<Vec<PathBuf>, VolumeError> {
            Ok(self.0.clone())
        }
    }

    fn patterns() -> Vec<String> {
        vec!["/media/{user}/{label}".to_string()]
    }

    #[test]
    fn render_substitutes_user_and_label() {
        let rendered = render_pattern("/media/{user}/{label}", "EOS_DIGITAL", "alice");
        assert_eq!(rendered, "/media/alice/EOS_DIGITAL");
    }

    #[test]
    fn single_match_resolves() {
        let provider = FixedRoots(vec![PathBuf::from("/media/alice/EOS_DIGITAL")]);
        let handle = locate_volume(&provider, &patterns(), "EOS_DIGITAL", "alice").unwrap();

        assert_eq!(handle.root_path, PathBuf::from("/media/alice/EOS_DIGITAL"));
        assert_eq!(handle.label, "EOS_DIGITAL");
    }

    #[test]
    fn no_match_is_not_found() {
        let provider = FixedRoots(vec![]);
        let err = locate_volume(&provider, &patterns(), "EOS_DIGITAL", "alice").unwrap_err();

        assert!(matches!(err, VolumeError::NotFound { .. }));
    }

    #[test]
    fn candidates_with_other_names_are_ignored() {
        let provider = FixedRoots(vec![
            PathBuf::from("/media/alice/BACKUP"),
            PathBuf::from("/media/alice/EOS_DIGITAL"),
        ]);
        let handle = locate_volume(&provider, &patterns(), "EOS_DIGITAL", "alice").unwrap();

        assert_eq!(handle.root_path, PathBuf::from("/media/alice/EOS_DIGITAL"));
    }

    #[test]
    fn two_distinct_matches_are_ambiguous() {
        let provider = FixedRoots(vec![
            PathBuf::from("/media/alice/EOS_DIGITAL"),
            PathBuf::from("/run/media/alice/EOS_DIGITAL"),
        ]);
        let err = locate_volume(&provider, &patterns(), "EOS_DIGITAL", "alice").unwrap_err();

        match err {
            VolumeError::Ambiguous { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn same_path_from_overlapping_patterns_counts_once() {
        let provider = FixedRoots(vec![PathBuf::from("/media/alice/EOS_DIGITAL")]);
        let overlapping = vec![
            "/media/{user}/{label}".to_string(),
            "/media/*/{label}".to_string(),
        ];
        let handle = locate_volume(&provider, &overlapping, "EOS_DIGITAL", "alice").unwrap();

        assert_eq!(handle.root_path, PathBuf::from("/media/alice/EOS_DIGITAL"));
    }
}
