//! Build cache for the native capture binary
//!
//! The capture binary is compiled from a single source file. Before every
//! session the cache compares modification timestamps: the binary is reused
//! only when it is strictly newer than its source. When either timestamp
//! cannot be read the cache assumes stale and rebuilds; it never skips a
//! build on unknown staleness.

use crate::error::BuildError;
use std::path::Path;
use tokio::process::Command;

/// Result of an `ensure_binary` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Binary was already newer than its source; compiler not invoked.
    CacheHit,
    /// Compiler ran and produced a fresh binary.
    Rebuilt,
}

/// Guarantee a ready-to-run capture binary at `binary`, compiling `source`
/// with `compiler` only when the cached binary is stale or missing.
pub async fn ensure_binary(
    source: &Path,
    binary: &Path,
    compiler: &str,
) -> Result<BuildStatus, BuildError> {
    if !source.exists() {
        return Err(BuildError::SourceNotFound(source.to_path_buf()));
    }

    if !is_stale(source, binary) {
        tracing::debug!("Capture binary up to date: {:?}", binary);
        return Ok(BuildStatus::CacheHit);
    }

    compile(source, binary, compiler).await?;
    Ok(BuildStatus::Rebuilt)
}

/// Compile unconditionally, bypassing the staleness check. The source must
/// still exist.
pub async fn force_rebuild(source: &Path, binary: &Path, compiler: &str) -> Result<(), BuildError> {
    if !source.exists() {
        return Err(BuildError::SourceNotFound(source.to_path_buf()));
    }
    compile(source, binary, compiler).await
}

/// Whether `ensure_binary` would invoke the compiler right now. Lets the CLI
/// announce compilation only when one is actually coming.
pub fn needs_rebuild(source: &Path, binary: &Path) -> bool {
    is_stale(source, binary)
}

/// A binary is stale unless it exists and its mtime is strictly greater than
/// the source's. Unreadable metadata on either side counts as stale.
fn is_stale(source: &Path, binary: &Path) -> bool {
    let binary_mtime = match std::fs::metadata(binary).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return true,
    };
    let source_mtime = match std::fs::metadata(source).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return true,
    };
    binary_mtime <= source_mtime
}

/// Invoke `compiler <source> -o <binary>`, capturing stdout and stderr in
/// full. Nonzero exit surfaces the stderr stream verbatim.
async fn compile(source: &Path, binary: &Path, compiler: &str) -> Result<(), BuildError> {
    tracing::info!("Compiling {:?} -> {:?} with {}", source, binary, compiler);

    let output = Command::new(compiler)
        .arg(source)
        .arg("-o")
        .arg(binary)
        .output()
        .await
        .map_err(|e| BuildError::CompilerUnavailable {
            compiler: compiler.to_string(),
            reason: e.to_string(),
        })?;

    if !output.stdout.is_empty() {
        tracing::debug!(
            "Compiler stdout:\n{}",
            String::from_utf8_lossy(&output.stdout).trim()
        );
    }

    if !output.status.success() {
        return Err(BuildError::CompileFailed {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    tracing::info!("Compilation successful");
    Ok(())
}
