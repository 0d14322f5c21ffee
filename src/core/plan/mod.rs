//! # Plan Module
//!
//! Resolves where an import batch lands.
//!
//! The destination folder name comes from a template over three
//! placeholders: `{date}` (earliest capture date in the batch,
//! `YYYY-MM-DD`), `{project_name}` and `{user}`. The default template
//! `{date}_{project_name}` turns a January 5th ski shoot into
//! `2024-01-05_ski_trip` under the destination base. Resolution is
//! pure; [`create_layout`] is the only function here that touches the
//! filesystem.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::scanner::FileRecord;
use crate::error::PlanError;

/// Where a batch will be written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationPlan {
    /// Destination base directory (e.g. `~/Photos`)
    pub base_path: PathBuf,
    /// Rendered template, relative to the base
    pub subfolder_path: PathBuf,
    /// `base_path` joined with `subfolder_path`
    pub final_path: PathBuf,
    /// Rendered working-folder segments created inside `final_path`
    pub subfolders: Vec<PathBuf>,
}

/// Resolves the destination layout for a batch of records.
///
/// Pure with respect to the filesystem: the same records and settings
/// always produce the same plan. An empty batch is
/// [`PlanError::NoSourceFiles`]; the batch date is the earliest
/// `captured_at` across all records.
pub fn resolve_destination(
    records: &[FileRecord],
    template: &str,
    subfolder_templates: &[String],
    project_name: &str,
    user: &str,
    base: &Path,
) -> Result<DestinationPlan, PlanError> {
    let batch_date = records
        .iter()
        .map(|r| r.captured_at.date_naive())
        .min()
        .ok_or(PlanError::NoSourceFiles)?;

    let subfolder_path = PathBuf::from(render_template(template, batch_date, project_name, user));
    let final_path = base.join(&subfolder_path);
    let subfolders = subfolder_templates
        .iter()
        .map(|t| PathBuf::from(render_template(t, batch_date, project_name, user)))
        .collect();

    Ok(DestinationPlan {
        base_path: base.to_path_buf(),
        subfolder_path,
        final_path,
        subfolders,
    })
}

/// Creates the planned directories.
///
/// A `final_path` that already exists and is not empty is
/// [`PlanError::Exists`] unless `allow_existing` is set; an empty
/// leftover directory never blocks an import. Any creation failure is
/// [`PlanError::Unwritable`].
pub fn create_layout(plan: &DestinationPlan, allow_existing: bool) -> Result<(), PlanError> {
    if !allow_existing && exists_non_empty(&plan.final_path)? {
        return Err(PlanError::Exists {
            path: plan.final_path.clone(),
        });
    }

    fs::create_dir_all(&plan.final_path).map_err(|e| PlanError::Unwritable {
        path: plan.final_path.clone(),
        source: e,
    })?;

    for subfolder in &plan.subfolders {
        let path = plan.final_path.join(subfolder);
        fs::create_dir_all(&path).map_err(|e| PlanError::Unwritable { path, source: e })?;
    }

    Ok(())
}

/// Substitutes `{date}`, `{project_name}` and `{user}` in a template.
fn render_template(template: &str, date: NaiveDate, project_name: &str, user: &str) -> String {
    template
        .replace("{date}", &date.format("%Y-%m-%d").to_string())
        .replace("{project_name}", project_name)
        .replace("{user}", user)
}

fn exists_non_empty(path: &Path) -> Result<bool, PlanError> {
    if !path.exists() {
        return Ok(false);
    }
    if !path.is_dir() {
        // A plain file in the way blocks regardless of contents
        return Ok(true);
    }
    let mut entries = fs::read_dir(path).map_err(|e| PlanError::Unwritable {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(entries.next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn record(name: &str, year: i32, month: u32, day: u32) -> FileRecord {
        FileRecord {
            relative_path: PathBuf::from(name),
            absolute_path: PathBuf::from("/card").join(name),
            size_bytes: 1,
            captured_at: Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn renders_default_template_from_earliest_capture() {
        let records = vec![
            record("IMG_0002.jpg", 2024, 1, 7),
            record("IMG_0001.jpg", 2024, 1, 5),
        ];

        let plan = resolve_destination(
            &records,
            "{date}_{project_name}",
            &[],
            "ski_trip",
            "alice",
            Path::new("/home/alice/Photos"),
        )
        .unwrap();

        assert_eq!(plan.subfolder_path, PathBuf::from("2024-01-05_ski_trip"));
        assert_eq!(
            plan.final_path,
            PathBuf::from("/home/alice/Photos/2024-01-05_ski_trip")
        );
    }

    #[test]
    fn template_may_nest_directories() {
        let records = vec![record("IMG_0001.jpg", 2024, 3, 9)];

        let plan = resolve_destination(
            &records,
            "{date}/{project_name}/{user}",
            &[],
            "studio",
            "bob",
            Path::new("/photos"),
        )
        .unwrap();

        assert_eq!(plan.final_path, PathBuf::from("/photos/2024-03-09/studio/bob"));
    }

    #[test]
    fn empty_batch_is_no_source_files() {
        let err = resolve_destination(
            &[],
            "{date}_{project_name}",
            &[],
            "ski_trip",
            "alice",
            Path::new("/photos"),
        )
        .unwrap_err();

        assert!(matches!(err, PlanError::NoSourceFiles));
    }

    #[test]
    fn resolution_is_idempotent() {
        let records = vec![record("IMG_0001.jpg", 2024, 1, 5)];
        let resolve = || {
            resolve_destination(
                &records,
                "{date}_{project_name}",
                &["selected".to_string()],
                "ski_trip",
                "alice",
                Path::new("/photos"),
            )
            .unwrap()
        };

        assert_eq!(resolve().final_path, resolve().final_path);
    }

    #[test]
    fn create_layout_builds_subfolders() {
        let temp = TempDir::new().unwrap();
        let records = vec![record("IMG_0001.jpg", 2024, 1, 5)];
        let plan = resolve_destination(
            &records,
            "{date}_{project_name}",
            &["selected".to_string(), "selected/exported".to_string()],
            "ski_trip",
            "alice",
            temp.path(),
        )
        .unwrap();

        create_layout(&plan, false).unwrap();

        assert!(plan.final_path.is_dir());
        assert!(plan.final_path.join("selected").is_dir());
        assert!(plan.final_path.join("selected/exported").is_dir());
    }

    #[test]
    fn existing_non_empty_destination_is_rejected() {
        let temp = TempDir::new().unwrap();
        let final_path = temp.path().join("2024-01-05_ski_trip");
        fs::create_dir_all(&final_path).unwrap();
        fs::write(final_path.join("old.jpg"), b"x").unwrap();

        let plan = DestinationPlan {
            base_path: temp.path().to_path_buf(),
            subfolder_path: PathBuf::from("2024-01-05_ski_trip"),
            final_path,
            subfolders: Vec::new(),
        };

        let err = create_layout(&plan, false).unwrap_err();
        assert!(matches!(err, PlanError::Exists { .. }));
    }

    #[test]
    fn allow_existing_merges_into_destination() {
        let temp = TempDir::new().unwrap();
        let final_path = temp.path().join("2024-01-05_ski_trip");
        fs::create_dir_all(&final_path).unwrap();
        fs::write(final_path.join("old.jpg"), b"x").unwrap();

        let plan = DestinationPlan {
            base_path: temp.path().to_path_buf(),
            subfolder_path: PathBuf::from("2024-01-05_ski_trip"),
            final_path: final_path.clone(),
            subfolders: vec![PathBuf::from("selected")],
        };

        create_layout(&plan, true).unwrap();
        assert!(final_path.join("selected").is_dir());
    }

    #[test]
    fn existing_empty_destination_does_not_block() {
        let temp = TempDir::new().unwrap();
        let final_path = temp.path().join("2024-01-05_ski_trip");
        fs::create_dir_all(&final_path).unwrap();

        let plan = DestinationPlan {
            base_path: temp.path().to_path_buf(),
            subfolder_path: PathBuf::from("2024-01-05_ski_trip"),
            final_path: final_path.clone(),
            subfolders: Vec::new(),
        };

        create_layout(&plan, false).unwrap();
        assert!(final_path.is_dir());
    }
}
