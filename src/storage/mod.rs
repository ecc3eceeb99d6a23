//! Temporary on-disk artifacts and their cleanup.
//!
//! Extracted images are written to a private directory under a fixed file
//! prefix. When the host instance goes away, [`LifecycleHook`] purges them on
//! a background task; failures there are logged and never reach rendering.

mod cleanup;

pub use cleanup::{ArtifactCleaner, CleanupReport, LifecycleHook};

use crate::config::ExtractConfig;
use anyhow::{Context, Result};
use chrono::Local;
use fs2::FileExt;
use log::{debug, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix shared by every artifact this crate writes.
pub const ARTIFACT_PREFIX: &str = "pathshape-";

const ARTIFACT_EXTENSION: &str = "png";
const LOCK_FILE_NAME: &str = ".pathshape.lock";

static ARTIFACT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Directory holding temporary artifacts.
#[derive(Debug, Clone)]
pub struct TempStorage {
    dir: PathBuf,
}

impl TempStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Uses the configured directory, or the platform cache directory.
    pub fn from_config(config: &ExtractConfig) -> Self {
        match &config.directory {
            Some(dir) => Self::new(dir),
            None => Self::new(default_dir()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes PNG bytes to a fresh artifact file and returns its path.
    pub fn write_artifact(&self, png: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create artifact directory {}", self.dir.display())
        })?;

        let lock = self.open_lock()?;
        lock.lock_shared()
            .with_context(|| format!("failed to lock artifact directory {}", self.dir.display()))?;

        let path = self.dir.join(next_artifact_name());
        let result = write_private(&path, png);

        lock.unlock()
            .unwrap_or_else(|err| warn!("failed to unlock {}: {}", self.dir.display(), err));

        result?;
        debug!("Wrote artifact {} ({} bytes)", path.display(), png.len());
        Ok(path)
    }

    /// Lists artifact files currently on disk.
    pub fn artifacts(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(found),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", self.dir.display()));
            }
        };

        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_artifact(&path) {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }

    /// Removes every artifact, holding the directory lock exclusively.
    ///
    /// Files that cannot be removed are counted in the report rather than
    /// aborting the purge.
    pub fn purge_blocking(&self) -> Result<CleanupReport> {
        if !self.dir.exists() {
            return Ok(CleanupReport::default());
        }

        let lock = self.open_lock()?;
        lock.lock_exclusive()
            .with_context(|| format!("failed to lock artifact directory {}", self.dir.display()))?;

        let result = self.artifacts().map(|paths| {
            let mut report = CleanupReport::default();
            for path in paths {
                match fs::remove_file(&path) {
                    Ok(()) => report.removed += 1,
                    Err(err) => {
                        warn!("failed to remove {}: {}", path.display(), err);
                        report.failed += 1;
                    }
                }
            }
            report
        });

        lock.unlock()
            .unwrap_or_else(|err| warn!("failed to unlock {}: {}", self.dir.display(), err));

        let report = result?;
        info!(
            "Purged {} artifacts from {} ({} failed)",
            report.removed,
            self.dir.display(),
            report.failed
        );
        Ok(report)
    }

    fn open_lock(&self) -> Result<File> {
        let lock_path = self.dir.join(LOCK_FILE_NAME);
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("failed to open lock file {}", lock_path.display()))
    }
}

/// Default artifact directory: the platform cache dir, else the system temp dir.
pub fn default_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pathshape")
}

fn next_artifact_name() -> String {
    let sequence = ARTIFACT_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}{}-{}-{}.{}",
        ARTIFACT_PREFIX,
        Local::now().format("%Y%m%d_%H%M%S_%3f"),
        std::process::id(),
        sequence,
        ARTIFACT_EXTENSION
    )
}

fn is_artifact(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(ARTIFACT_PREFIX));
    let extension_matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == ARTIFACT_EXTENSION);
    name_matches && extension_matches
}

fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    // User read/write only, applied at creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(data)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_artifact_creates_prefixed_png() {
        let temp = tempfile::tempdir().unwrap();
        let storage = TempStorage::new(temp.path().join("artifacts"));

        let path = storage.write_artifact(b"png-bytes").unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(ARTIFACT_PREFIX));
        assert!(name.ends_with(".png"));
        assert_eq!(fs::read(&path).unwrap(), b"png-bytes");
        assert_eq!(storage.artifacts().unwrap(), vec![path]);
    }

    #[test]
    fn artifact_names_are_unique() {
        let temp = tempfile::tempdir().unwrap();
        let storage = TempStorage::new(temp.path());
        let a = storage.write_artifact(b"a").unwrap();
        let b = storage.write_artifact(b"b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn purge_removes_only_artifacts() {
        let temp = tempfile::tempdir().unwrap();
        let storage = TempStorage::new(temp.path());
        storage.write_artifact(b"one").unwrap();
        storage.write_artifact(b"two").unwrap();
        let unrelated = temp.path().join("keep.png");
        let foreign = temp.path().join("pathshape-notes.txt");
        fs::write(&unrelated, b"keep").unwrap();
        fs::write(&foreign, b"keep").unwrap();

        let report = storage.purge_blocking().unwrap();
        assert_eq!(report.removed, 2);
        assert_eq!(report.failed, 0);
        assert!(storage.artifacts().unwrap().is_empty());
        assert!(unrelated.exists());
        assert!(foreign.exists());
    }

    #[test]
    fn purge_of_missing_directory_is_a_no_op() {
        let temp = tempfile::tempdir().unwrap();
        let storage = TempStorage::new(temp.path().join("never-created"));
        let report = storage.purge_blocking().unwrap();
        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn existing_files_are_never_overwritten() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pathshape-taken.png");
        fs::write(&path, b"original").unwrap();

        assert!(write_private(&path, b"replacement").is_err());
        assert_eq!(fs::read(&path).unwrap(), b"original");
    }

    #[test]
    #[cfg(unix)]
    fn private_files_are_created_without_group_or_other_access() {
        use std::os::unix::fs::PermissionsExt;
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pathshape-direct.png");
        write_private(&path, b"secret").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
        assert_eq!(mode & 0o600, 0o600);
    }

    #[test]
    #[cfg(unix)]
    fn artifacts_are_private_to_the_user() {
        use std::os::unix::fs::PermissionsExt;
        let temp = tempfile::tempdir().unwrap();
        let storage = TempStorage::new(temp.path());
        let path = storage.write_artifact(b"secret").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
