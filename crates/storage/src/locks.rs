//! Per-domain write serialization.
//!
//! Within a process each domain has an async mutex. When the registry is
//! given a lock directory it additionally holds an OS advisory lock on
//! `<domain>_evolution_history.lock`, so separate processes appending to the
//! same history wait for each other.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::trait_::{Result, StorageError};

const LOCK_SUFFIX: &str = "_evolution_history.lock";

/// Guard held while a domain's history is being rewritten.
///
/// Dropping it releases the file lock (if any) and then the in-process lock.
#[derive(Debug)]
pub struct DomainGuard {
    _release: Option<oneshot::Sender<()>>,
    _local: OwnedMutexGuard<()>,
}

/// Registry of one lock per domain.
#[derive(Debug, Default)]
pub struct DomainLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    lock_dir: Option<PathBuf>,
}

impl DomainLocks {
    /// Create a registry that only serializes within this process.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that also takes a file lock under `dir`.
    pub fn with_lock_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            locks: Mutex::default(),
            lock_dir: Some(dir.into()),
        }
    }

    /// Path of the lock file for `domain`, if file locking is enabled.
    pub fn lock_path(&self, domain: &str) -> Option<PathBuf> {
        self.lock_dir
            .as_deref()
            .map(|dir| dir.join(format!("{}{}", domain, LOCK_SUFFIX)))
    }

    /// Wait for and take the lock for `domain`.
    pub async fn acquire(&self, domain: &str) -> Result<DomainGuard> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(domain.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let local = lock.lock_owned().await;

        let release = match self.lock_path(domain) {
            Some(path) => Some(hold_file_lock(path).await?),
            None => None,
        };

        Ok(DomainGuard {
            _release: release,
            _local: local,
        })
    }
}

/// Take an exclusive advisory lock on `path` from a blocking thread.
///
/// The thread keeps the lock until the returned sender is dropped.
async fn hold_file_lock(path: PathBuf) -> Result<oneshot::Sender<()>> {
    let (acquired_tx, acquired_rx) = oneshot::channel::<std::io::Result<()>>();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    tokio::task::spawn_blocking(move || {
        let file = match open_lock_file(&path) {
            Ok(file) => file,
            Err(e) => {
                let _ = acquired_tx.send(Err(e));
                return;
            }
        };
        let mut lock = fd_lock::RwLock::new(file);
        let guard = match lock.write() {
            Ok(guard) => guard,
            Err(e) => {
                let _ = acquired_tx.send(Err(e));
                return;
            }
        };
        debug!("Acquired file lock {}", path.display());

        // Caller gave up while we were waiting.
        if acquired_tx.send(Ok(())).is_err() {
            return;
        }
        let _ = release_rx.blocking_recv();
        drop(guard);
    });

    match acquired_rx.await {
        Ok(Ok(())) => Ok(release_tx),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(StorageError::Other("file lock thread exited".to_string())),
    }
}

fn open_lock_file(path: &Path) -> std::io::Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
}
