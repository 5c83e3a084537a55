// Command-line interface definitions for sckrec
//
// This module is separate so it can be used by both the binary (main.rs)
// and build.rs for generating man pages.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sckrec")]
#[command(author, version, about = "Record system audio via a native ScreenCaptureKit recorder")]
#[command(long_about = "
sckrec drives a small native recorder binary built from a single source file.
It compiles the recorder on demand (and only when the source changed), then
runs it for one capture session and reports where the recording was written.

USAGE:
  Run `sckrec` with no arguments for interactive mode selection, or pass
  --mode/--duration for scripted use. Press Ctrl+C during a capture to stop
  it early; the recorder finalizes the partial file.
")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<std::path::PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Message language (en, zh; overrides config)
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one capture session (default if no command specified)
    Record {
        /// Capture mode: internal, microphone, or both (prompts when omitted)
        #[arg(long, value_name = "MODE")]
        mode: Option<String>,

        /// Duration in seconds; omit for continuous capture (until Ctrl+C)
        #[arg(long, value_name = "SECONDS")]
        duration: Option<u32>,

        /// Override the output directory
        #[arg(long, value_name = "DIR")]
        output_dir: Option<std::path::PathBuf>,
    },

    /// Build or refresh the native capture binary without recording
    Build {
        /// Recompile even when the cached binary is newer than the source
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Config,
}
