//! # photo-import CLI
//!
//! Command-line interface for the photo importer.
//!
//! ## Usage
//! ```bash
//! photo-import ski_trip
//! photo-import ski_trip --label LUMIX --no-verify
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    photo_import::init_tracing();
    cli::run()
}
