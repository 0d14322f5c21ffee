//! # CLI Module
//!
//! Command-line interface for the photo importer.
//!
//! ## Usage
//! ```bash
//! # Offload the card labelled EOS_DIGITAL into a ski_trip folder
//! photo-import ski_trip
//!
//! # A differently labelled card
//! photo-import ski_trip --label LUMIX
//!
//! # Merge into a folder from an earlier, interrupted run
//! photo-import ski_trip --allow-existing
//!
//! # Skip the post-copy verification pass
//! photo-import ski_trip --no-verify
//! ```
//!
//! ## Exit codes
//! `0` success, `2` volume not found or ambiguous, `3` nothing to copy,
//! `4` one or more files failed to copy, `5` verification mismatch,
//! `1` any other error.

use clap::Parser;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_import::config::ImportConfig;
use photo_import::core::pipeline::{ImportOutcome, ImportPipeline};
use photo_import::error::{ImportError, PlanError, Result, VolumeError};
use photo_import::events::{CopyEvent, Event, EventChannel, LocateEvent, PipelineEvent, ScanEvent};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

/// Photo Import - Offload a camera card into a dated project folder
#[derive(Parser, Debug)]
#[command(name = "photo-import")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project name for the destination folder
    project_name: String,

    /// Volume label of the camera card
    #[arg(short, long, default_value = "EOS_DIGITAL")]
    label: String,

    /// User name substituted into mount patterns and folder templates
    #[arg(short, long, default_value_t = default_user())]
    user: String,

    /// Skip the post-copy verification pass
    #[arg(long)]
    no_verify: bool,

    /// Merge into a destination folder that already exists
    #[arg(long)]
    allow_existing: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn default_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "user".to_string())
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match run_import(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn exit_code_for(error: &ImportError) -> u8 {
    match error {
        // A bad mount pattern is a config mistake, not a missing card
        ImportError::Volume(VolumeError::NotFound { .. })
        | ImportError::Volume(VolumeError::Ambiguous { .. }) => 2,
        ImportError::Plan(PlanError::NoSourceFiles) => 3,
        _ => 1,
    }
}

fn run_import(cli: Cli) -> Result<ExitCode> {
    let term = Term::stderr();

    if !cli.quiet {
        term.write_line(&format!(
            "{} {}",
            style("Photo Import").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => ImportConfig::default_path()?,
    };
    let config = ImportConfig::load(&config_path)?;

    let pipeline = ImportPipeline::builder(config, cli.project_name.clone())
        .label(cli.label.clone())
        .user(cli.user.clone())
        .verify(!cli.no_verify)
        .allow_existing(cli.allow_existing)
        .build();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar unless quiet
    let progress = if cli.quiet {
        None
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(format!("{}", phase));
                    }
                }
                Event::Locate(LocateEvent::Found { root }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.println(format!(
                            "{} volume at {}",
                            style("✓").green(),
                            root.display()
                        ));
                    }
                }
                Event::Scan(ScanEvent::Skipped { path, reason }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.println(format!(
                            "{} skipped {}: {}",
                            style("!").yellow().bold(),
                            path.display(),
                            reason
                        ));
                    }
                }
                Event::Scan(ScanEvent::Completed {
                    total_files,
                    total_bytes,
                }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.println(format!(
                            "{} {} photos found ({})",
                            style("✓").green(),
                            total_files,
                            format_bytes(total_bytes)
                        ));
                    }
                }
                Event::Copy(CopyEvent::Started { total_files, .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(total_files as u64);
                        pb.set_position(0);
                    }
                }
                Event::Copy(CopyEvent::FileFinished(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position((p.file_index + 1) as u64);
                        pb.set_message(format!(
                            "{} / {}",
                            format_bytes(p.bytes_done),
                            format_bytes(p.bytes_total)
                        ));
                    }
                }
                Event::Copy(CopyEvent::FileFailed { path, reason, .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.println(format!(
                            "{} failed {}: {}",
                            style("✗").red().bold(),
                            path.display(),
                            reason
                        ));
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    // Run the pipeline
    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let outcome = result?;

    if !cli.quiet {
        print_summary(&term, &outcome);
    }

    if outcome.copy.total_failed > 0 {
        return Ok(ExitCode::from(4));
    }
    if let Some(verification) = &outcome.verification {
        if !verification.is_match() {
            return Ok(ExitCode::from(5));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(term: &Term, outcome: &ImportOutcome) {
    let clean = outcome.copy.is_complete()
        && outcome
            .verification
            .as_ref()
            .map(|v| v.is_match())
            .unwrap_or(true);

    term.write_line("").ok();
    if clean {
        term.write_line(&format!("{} Import Complete", style("✓").green().bold()))
            .ok();
    } else {
        term.write_line(&format!(
            "{} Import finished with problems",
            style("!").yellow().bold()
        ))
        .ok();
    }
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} copied to {} in {:.1}s",
        style(format_bytes(outcome.copy.bytes_copied)).cyan(),
        style(outcome.plan.final_path.display()).cyan(),
        outcome.duration_ms as f64 / 1000.0
    ))
    .ok();

    let failed = if outcome.copy.total_failed > 0 {
        style(outcome.copy.total_failed).red().bold()
    } else {
        style(outcome.copy.total_failed).dim()
    };
    term.write_line(&format!(
        "  {} files copied, {} failed",
        style(outcome.copy.total_succeeded).cyan(),
        failed
    ))
    .ok();

    if !outcome.scan_skipped.is_empty() {
        term.write_line(&format!(
            "  {} files skipped during scan",
            style(outcome.scan_skipped.len()).yellow()
        ))
        .ok();
    }

    if outcome.copy.cancelled {
        term.write_line(&format!(
            "  {} cancelled before all files were attempted",
            style("!").yellow().bold()
        ))
        .ok();
    }

    match &outcome.verification {
        Some(v) if v.is_match() => {
            term.write_line(&format!(
                "  {} verified: {} files, {} at the destination",
                style("✓").green(),
                v.dest_file_count,
                format_bytes(v.dest_total_bytes)
            ))
            .ok();
            term.write_line("").ok();
            term.write_line(&format!(
                "{}",
                style("The card contents landed intact. Safe to wipe the card.").dim()
            ))
            .ok();
        }
        Some(v) => {
            term.write_line(&format!(
                "  {} verification failed: {} source files ({}) vs {} destination files ({})",
                style("✗").red().bold(),
                v.source_file_count,
                format_bytes(v.source_total_bytes),
                v.dest_file_count,
                format_bytes(v.dest_total_bytes)
            ))
            .ok();
            for mismatch in &v.mismatches {
                term.write_line(&format!("    {} {}", style("•").red(), mismatch))
                    .ok();
            }
            term.write_line("").ok();
            term.write_line(&format!(
                "{}",
                style("Do NOT wipe the card until every file above is accounted for.")
                    .red()
                    .bold()
            ))
            .ok();
        }
        None => {
            term.write_line(&format!(
                "  {} verification skipped",
                style("-").dim()
            ))
            .ok();
            term.write_line("").ok();
            term.write_line(&format!(
                "{}",
                style("The copy was not verified. Check the destination before wiping the card.")
                    .dim()
            ))
            .ok();
        }
    }

    term.write_line("").ok();
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
