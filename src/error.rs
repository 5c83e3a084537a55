//! Error types for sckrec
//!
//! Uses thiserror for ergonomic error definitions with clear messages
//! that guide users toward fixing common issues.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the sckrec application
#[derive(Error, Debug)]
pub enum SckrecError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Another capture session is already running (lock: {0:?})")]
    AlreadyRunning(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the build cache (compiling the native capture binary)
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Capture source not found: {0:?}\n  Set [build].source in the config to the recorder source file.")]
    SourceNotFound(PathBuf),

    #[error("Compiler failed:\n{stderr}")]
    CompileFailed { stderr: String },

    #[error("Cannot run compiler '{compiler}': {reason}")]
    CompilerUnavailable { compiler: String, reason: String },
}

/// Errors from the capture session (launching and waiting on the native binary)
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to launch capture binary {binary:?}: {reason}")]
    SpawnFailed { binary: PathBuf, reason: String },

    #[error("Failed waiting for capture binary: {0}")]
    WaitFailed(String),
}

/// Result type alias using SckrecError
pub type Result<T> = std::result::Result<T, SckrecError>;
