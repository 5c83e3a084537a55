//! Output path management
//!
//! Generates timestamped `.wav` output paths and makes sure the output
//! directory exists before a capture session is launched.

use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Create the output directory (and parents) if absent. Idempotent; fails
/// only on a real filesystem error (permissions, path is a file).
pub fn ensure_directory(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Generate `dir/recording_<YYYYMMDD_HHMMSS>.wav` from the local wall clock.
///
/// Resolution is one second: two sessions started within the same second get
/// the same path. Accepted limitation, callers should not rely on sub-second
/// uniqueness.
pub fn generate_output_path(dir: &Path) -> PathBuf {
    dir.join(file_name_for(Local::now().naive_local()))
}

fn file_name_for(timestamp: NaiveDateTime) -> String {
    format!("recording_{}.wav", timestamp.format("%Y%m%d_%H%M%S"))
}
