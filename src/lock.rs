//! Single-instance lock
//!
//! One orchestrator at a time: concurrent instances would race on the build
//! cache for the same source/binary pair, so both `record` and `build` hold
//! this lock. The lock is a pid file in the runtime directory; files left by
//! dead processes are reclaimed on the next acquire.

use crate::error::{Result, SckrecError};
use std::path::{Path, PathBuf};

/// A held single-instance lock. Dropping without `release` leaves the pid
/// file behind; it is reclaimed as stale once the process is gone.
pub struct InstanceLock {
    inner: pidlock::Pidlock,
    path: PathBuf,
}

/// Acquire the single-instance lock at `path`, creating its parent directory
/// first. A lock held by a live process maps to `AlreadyRunning`; a failure
/// with no lock file on disk is a filesystem problem and reported as such.
pub fn acquire(path: &Path) -> Result<InstanceLock> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let path_str = path.to_string_lossy().to_string();
    let mut inner = pidlock::Pidlock::new(&path_str);
    if inner.acquire().is_err() {
        // pidlock reports every acquire failure the same way; only a lock
        // file actually present on disk means a competing instance.
        if path.exists() {
            return Err(SckrecError::AlreadyRunning(path.to_path_buf()));
        }
        return Err(SckrecError::Config(format!(
            "Cannot create lock file {:?}: check permissions on its directory",
            path
        )));
    }

    tracing::debug!("Acquired instance lock at {:?}", path);
    Ok(InstanceLock {
        inner,
        path: path.to_path_buf(),
    })
}

impl std::fmt::Debug for InstanceLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceLock")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl InstanceLock {
    pub fn release(mut self) {
        if let Err(e) = self.inner.release() {
            tracing::warn!("Failed to release lock file {:?}: {:?}", self.path, e);
        }
    }
}
