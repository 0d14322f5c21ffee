//! Pipeline execution implementation.

use std::time::Instant;

use tracing::debug;

use crate::config::ImportConfig;
use crate::core::copy::{copy_files, CancellationToken, CopyReport};
use crate::core::plan::{create_layout, resolve_destination, DestinationPlan};
use crate::core::scanner::{enumerate, scan_roots, ExtensionFilter, SkippedFile};
use crate::core::verify::{verify, VerificationReport};
use crate::core::volume::{locate_volume, GlobVolumeProvider, VolumeHandle, VolumeProvider};
use crate::error::Result;
use crate::events::{
    null_sender, Event, EventSender, ImportPhase, ImportSummary, LocateEvent, PipelineEvent,
    VerifyEvent,
};

/// Result of a full import run
#[derive(Debug)]
pub struct ImportOutcome {
    /// The volume the batch came from
    pub volume: VolumeHandle,
    /// Where the batch landed
    pub plan: DestinationPlan,
    /// Files the scanner saw but could not read
    pub scan_skipped: Vec<SkippedFile>,
    /// Per-file copy outcome
    pub copy: CopyReport,
    /// Destination check, when verification ran
    pub verification: Option<VerificationReport>,
    /// Wall-clock duration of the whole run
    pub duration_ms: u64,
}

/// Builder for an import run
pub struct ImportPipelineBuilder {
    config: ImportConfig,
    project_name: String,
    label: String,
    user: String,
    verify: bool,
    allow_existing: bool,
    provider: Box<dyn VolumeProvider>,
    cancel: CancellationToken,
}

impl ImportPipelineBuilder {
    /// Create a builder for importing into the named project
    pub fn new(config: ImportConfig, project_name: impl Into<String>) -> Self {
        Self {
            config,
            project_name: project_name.into(),
            label: "EOS_DIGITAL".to_string(),
            user: std::env::var("USER").unwrap_or_else(|_| "user".to_string()),
            verify: true,
            allow_existing: false,
            provider: Box::new(GlobVolumeProvider),
            cancel: CancellationToken::new(),
        }
    }

    /// Volume label to look for
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// User name substituted into mount patterns and templates
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Whether to verify the destination after copying
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Merge into an existing non-empty destination folder
    pub fn allow_existing(mut self, allow: bool) -> Self {
        self.allow_existing = allow;
        self
    }

    /// Substitute the volume provider (used by tests)
    pub fn provider(mut self, provider: Box<dyn VolumeProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Token observed between copied files
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> ImportPipeline {
        ImportPipeline {
            config: self.config,
            project_name: self.project_name,
            label: self.label,
            user: self.user,
            verify: self.verify,
            allow_existing: self.allow_existing,
            provider: self.provider,
            cancel: self.cancel,
        }
    }
}

/// The photo import pipeline
pub struct ImportPipeline {
    config: ImportConfig,
    project_name: String,
    label: String,
    user: String,
    verify: bool,
    allow_existing: bool,
    provider: Box<dyn VolumeProvider>,
    cancel: CancellationToken,
}

impl ImportPipeline {
    /// Create a new pipeline builder
    pub fn builder(config: ImportConfig, project_name: impl Into<String>) -> ImportPipelineBuilder {
        ImportPipelineBuilder::new(config, project_name)
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<ImportOutcome> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<ImportOutcome> {
        match self.execute(events) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                events.send(Event::Pipeline(PipelineEvent::Error {
                    message: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    fn execute(&self, events: &EventSender) -> Result<ImportOutcome> {
        let start_time = Instant::now();

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Locate
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: ImportPhase::Locating,
        }));
        events.send(Event::Locate(LocateEvent::Started {
            label: self.label.clone(),
        }));

        let volume = locate_volume(
            self.provider.as_ref(),
            &self.config.mount_patterns,
            &self.label,
            &self.user,
        )?;
        debug!(root = %volume.root_path.display(), "volume located");
        events.send(Event::Locate(LocateEvent::Found {
            root: volume.root_path.clone(),
        }));

        // Phase 2: Scan
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: ImportPhase::Scanning,
        }));

        let roots = scan_roots(&volume.root_path, &self.config.source_patterns)?;
        let filter = ExtensionFilter::new(&self.config.photo_extensions);
        let scan = enumerate(&roots, &filter, events)?;
        debug!(
            files = scan.records.len(),
            skipped = scan.skipped.len(),
            "scan complete"
        );

        // Phase 3: Plan
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: ImportPhase::Planning,
        }));

        let base = self.config.destination_base()?;
        let plan = resolve_destination(
            &scan.records,
            &self.config.destination_template,
            &self.config.subfolders,
            &self.project_name,
            &self.user,
            &base,
        )?;
        create_layout(&plan, self.allow_existing)?;
        debug!(destination = %plan.final_path.display(), "destination ready");

        // Phase 4: Copy
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: ImportPhase::Copying,
        }));

        let copy = copy_files(&scan.records, &plan.final_path, events, &self.cancel)?;

        if copy.cancelled {
            events.send(Event::Pipeline(PipelineEvent::Cancelled));
        }

        // Phase 5: Verify. A cancelled batch is knowingly incomplete, so
        // checking it would only restate the cancellation
        let verification = if self.verify && !copy.cancelled {
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: ImportPhase::Verifying,
            }));
            events.send(Event::Verify(VerifyEvent::Started {
                path: plan.final_path.clone(),
            }));

            let report = verify(&scan.records, &plan.final_path, &filter)?;
            events.send(Event::Verify(VerifyEvent::Completed {
                mismatches: report.mismatches.len(),
            }));
            Some(report)
        } else {
            None
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: ImportSummary {
                files_copied: copy.total_succeeded,
                files_failed: copy.total_failed,
                bytes_copied: copy.bytes_copied,
                verified: verification.as_ref().map(|v| v.is_match()),
                duration_ms,
            },
        }));

        Ok(ImportOutcome {
            volume,
            plan,
            scan_skipped: scan.skipped,
            copy,
            verification,
            duration_ms,
        })
    }
}
