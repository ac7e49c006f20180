//! Atomic file transfer, retry policy and install-root locking

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Retry policy for transient I/O failures during a transfer.
///
/// Only `Interrupted`, `WouldBlock` and `TimedOut` errors are retried; every
/// other error fails immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// Delay before the first retry
    pub initial_interval: Duration,
    /// Give up once this much time has been spent retrying
    pub max_elapsed: Duration,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(50),
            max_elapsed: Duration::from_secs(2),
        }
    }
}

impl RobustnessConfig {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_elapsed: Duration::ZERO,
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Run `op`, retrying transient I/O errors according to `robustness`.
pub fn with_retry<T>(
    robustness: RobustnessConfig,
    mut op: impl FnMut() -> io::Result<T>,
) -> io::Result<T> {
    if robustness.max_elapsed.is_zero() {
        return op();
    }

    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(robustness.initial_interval)
        .with_max_elapsed_time(Some(robustness.max_elapsed))
        .build();

    backoff::retry(policy, || {
        op().map_err(|e| {
            if is_transient(&e) {
                tracing::debug!(error = %e, "retrying transient I/O error");
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    })
    .map_err(|e| match e {
        backoff::Error::Permanent(e) => e,
        backoff::Error::Transient { err, .. } => err,
    })
}

/// Copy a single file so that `dest` is never observed half-written.
///
/// The content is streamed into a locked temp file in the destination
/// directory, flushed, then renamed over `dest`.
pub fn copy_file_atomic(src: &Path, dest: &NormalizedPath) -> io::Result<()> {
    let native_path = dest.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let result = (|| {
        let mut source = File::open(src)?;
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        FileExt::lock_exclusive(&temp_file)?;
        io::copy(&mut source, &mut temp_file)?;
        temp_file.sync_all()?;
        FileExt::unlock(&temp_file)?;

        fs::rename(&temp_path, &native_path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Advisory lock over an install root, released on drop.
#[derive(Debug)]
pub struct InstallLock {
    file: File,
    path: NormalizedPath,
}

impl InstallLock {
    /// Take the lock at `path` without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockFailed`] if another process holds the lock.
    pub fn acquire(path: &NormalizedPath) -> Result<Self> {
        let native_path = path.to_native();
        if let Some(parent) = native_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native_path)
            .map_err(|e| Error::io(&native_path, e))?;

        FileExt::try_lock_exclusive(&file).map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

        Ok(Self {
            file,
            path: path.clone(),
        })
    }

    /// Location of the lock file.
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
