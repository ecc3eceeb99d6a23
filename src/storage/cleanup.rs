//! Best-effort artifact cleanup triggered by host teardown.

use super::TempStorage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::{Arc, Weak};
use tokio::task::{self, JoinHandle};
use tokio::time::{Duration, sleep};

const RETRY_BACKOFF: Duration = Duration::from_millis(20);

/// Outcome of one purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub failed: usize,
}

/// Abstraction over purging temporary artifacts.
#[async_trait]
pub trait ArtifactCleaner: Send + Sync {
    async fn purge(&self) -> Result<CleanupReport>;
}

#[async_trait]
impl ArtifactCleaner for TempStorage {
    async fn purge(&self) -> Result<CleanupReport> {
        let storage = self.clone();
        task::spawn_blocking(move || storage.purge_blocking())
            .await
            .context("cleanup task failed")?
    }
}

/// Host teardown notification wired to artifact cleanup.
///
/// Holds the cleaner weakly: if the storage has already been dropped there
/// is nothing left to clean and teardown is a no-op.
#[derive(Clone)]
pub struct LifecycleHook {
    cleaner: Weak<dyn ArtifactCleaner>,
    max_retries: u32,
}

impl LifecycleHook {
    pub fn new<C: ArtifactCleaner + 'static>(cleaner: &Arc<C>, max_retries: u32) -> Self {
        let cleaner: Weak<dyn ArtifactCleaner> = Arc::<C>::downgrade(cleaner);
        Self {
            cleaner,
            max_retries,
        }
    }

    /// Spawns the purge on `runtime` without waiting for it.
    ///
    /// Returns `None` when the cleaner is gone. The task resolves to the
    /// purge report, or `None` once every retry has failed.
    pub fn instance_destroyed(
        &self,
        runtime: &tokio::runtime::Handle,
    ) -> Option<JoinHandle<Option<CleanupReport>>> {
        let Some(cleaner) = self.cleaner.upgrade() else {
            info!("Artifact storage already released, skipping cleanup");
            return None;
        };
        let max_retries = self.max_retries;
        Some(runtime.spawn(async move { purge_with_retries(cleaner, max_retries).await }))
    }
}

/// Purges until nothing is left behind or the retries run out.
///
/// Both a failed purge and one that left files in place count as a failed
/// attempt. Files removed by earlier attempts are included in the report.
async fn purge_with_retries(
    cleaner: Arc<dyn ArtifactCleaner>,
    max_retries: u32,
) -> Option<CleanupReport> {
    let mut attempt = 0;
    let mut removed = 0;
    loop {
        let outcome = cleaner.purge().await;
        if let Ok(report) = &outcome {
            removed += report.removed;
        }
        match outcome {
            Ok(report) if report.failed == 0 || attempt >= max_retries => {
                if report.failed > 0 {
                    warn!("Artifact cleanup left {} file(s) behind", report.failed);
                }
                return Some(CleanupReport {
                    removed,
                    failed: report.failed,
                });
            }
            Ok(report) => {
                attempt += 1;
                warn!(
                    "Artifact cleanup left {} file(s), retrying ({}/{})",
                    report.failed, attempt, max_retries
                );
            }
            Err(err) if attempt < max_retries => {
                attempt += 1;
                warn!(
                    "Artifact cleanup failed ({:#}), retrying ({}/{})",
                    err, attempt, max_retries
                );
            }
            Err(err) => {
                warn!("Artifact cleanup abandoned: {:#}", err);
                return None;
            }
        }
        sleep(RETRY_BACKOFF * attempt).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FlakyCleaner {
        failures_left: Mutex<u32>,
        calls: Mutex<u32>,
    }

    impl FlakyCleaner {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures_left: Mutex::new(failures),
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl ArtifactCleaner for FlakyCleaner {
        async fn purge(&self) -> Result<CleanupReport> {
            *self.calls.lock().unwrap() += 1;
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                Err(anyhow::anyhow!("disk busy"))
            } else {
                Ok(CleanupReport {
                    removed: 3,
                    failed: 0,
                })
            }
        }
    }

    /// Reports a fixed sequence of purge outcomes, then clean purges.
    struct StubbornFiles {
        outcomes: Mutex<Vec<CleanupReport>>,
        calls: Mutex<u32>,
    }

    impl StubbornFiles {
        fn new(mut outcomes: Vec<CleanupReport>) -> Arc<Self> {
            outcomes.reverse();
            Arc::new(Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl ArtifactCleaner for StubbornFiles {
        async fn purge(&self) -> Result<CleanupReport> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.outcomes.lock().unwrap().pop().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn files_left_behind_are_retried() {
        let cleaner = StubbornFiles::new(vec![
            CleanupReport {
                removed: 2,
                failed: 1,
            },
            CleanupReport {
                removed: 1,
                failed: 0,
            },
        ]);
        let hook = LifecycleHook::new(&cleaner, 3);
        let report = hook
            .instance_destroyed(&tokio::runtime::Handle::current())
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            report,
            Some(CleanupReport {
                removed: 3,
                failed: 0
            })
        );
        assert_eq!(*cleaner.calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn leftovers_are_reported_once_retries_run_out() {
        let stuck = CleanupReport {
            removed: 0,
            failed: 1,
        };
        let cleaner = StubbornFiles::new(vec![stuck; 5]);
        let hook = LifecycleHook::new(&cleaner, 2);
        let report = hook
            .instance_destroyed(&tokio::runtime::Handle::current())
            .unwrap()
            .await
            .unwrap();

        assert_eq!(report, Some(stuck));
        assert_eq!(*cleaner.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn hook_purges_storage_in_background() {
        let temp = tempfile::tempdir().unwrap();
        let storage = Arc::new(TempStorage::new(temp.path()));
        storage.write_artifact(b"x").unwrap();

        let hook = LifecycleHook::new(&storage, 0);
        let handle = hook
            .instance_destroyed(&tokio::runtime::Handle::current())
            .expect("storage alive");
        let report = handle.await.unwrap().expect("purge succeeded");

        assert_eq!(report.removed, 1);
        assert!(storage.artifacts().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hook_is_inert_after_storage_dropped() {
        let cleaner = FlakyCleaner::new(0);
        let hook = LifecycleHook::new(&cleaner, 3);
        drop(cleaner);
        assert!(
            hook.instance_destroyed(&tokio::runtime::Handle::current())
                .is_none()
        );
    }

    #[tokio::test]
    async fn failed_purges_are_retried() {
        let cleaner = FlakyCleaner::new(2);
        let hook = LifecycleHook::new(&cleaner, 3);
        let report = hook
            .instance_destroyed(&tokio::runtime::Handle::current())
            .unwrap()
            .await
            .unwrap();

        assert_eq!(report.map(|r| r.removed), Some(3));
        assert_eq!(*cleaner.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_resolve_to_none() {
        let cleaner = FlakyCleaner::new(10);
        let hook = LifecycleHook::new(&cleaner, 1);
        let report = hook
            .instance_destroyed(&tokio::runtime::Handle::current())
            .unwrap()
            .await
            .unwrap();

        assert!(report.is_none());
        assert_eq!(*cleaner.calls.lock().unwrap(), 2);
    }
}
