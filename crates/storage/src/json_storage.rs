//! JSON file storage implementation.
//!
//! Stores one `<domain>_evolution_history.json` file per domain under a meta
//! directory. Writes go to a uniquely named temporary sibling first and are
//! renamed into place, so a crash mid-write never leaves a truncated history
//! behind and concurrent writers never share a temp file. Domain locks are
//! backed by `<domain>_evolution_history.lock` files in the same directory.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use ulid::Ulid;

use super::{HistoryStorage, HistoryDocument, Result};
use crate::locks::{DomainGuard, DomainLocks};
use crate::trait_::check_domain;

const FILE_SUFFIX: &str = "_evolution_history.json";

/// File-based JSON history backend.
#[derive(Debug)]
pub struct JsonHistoryStorage {
    root: PathBuf,
    locks: DomainLocks,
}

impl JsonHistoryStorage {
    /// Create storage rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;

        Ok(Self {
            locks: DomainLocks::with_lock_dir(&root),
            root,
        })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the history file for a domain.
    pub fn history_path(&self, domain: &str) -> PathBuf {
        self.root.join(format!("{}{}", domain, FILE_SUFFIX))
    }
}

#[async_trait]
impl HistoryStorage for JsonHistoryStorage {
    async fn load_history(&self, domain: &str) -> Result<Option<HistoryDocument>> {
        check_domain(domain)?;
        match fs::read_to_string(self.history_path(domain)).await {
            Ok(text) => Ok(Some(HistoryDocument::decode(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_history(&self, document: &HistoryDocument) -> Result<()> {
        check_domain(&document.domain)?;
        let path = self.history_path(&document.domain);
        let tmp = path.with_extension(format!("json.{}.tmp", Ulid::new()));

        let json = document.encode()?;
        fs::write(&tmp, json.as_bytes()).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(
            "Saved {} cycles for domain {} to {}",
            document.total_cycles,
            document.domain,
            path.display()
        );
        Ok(())
    }

    async fn list_domains(&self) -> Result<Vec<String>> {
        let mut domains = Vec::new();
        let mut rd = fs::read_dir(&self.root).await?;
        while let Some(entry) = rd.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(domain) = name.strip_suffix(FILE_SUFFIX) {
                if !domain.is_empty() {
                    domains.push(domain.to_string());
                }
            }
        }
        domains.sort();
        Ok(domains)
    }

    async fn lock_domain(&self, domain: &str) -> Result<DomainGuard> {
        check_domain(domain)?;
        self.locks.acquire(domain).await
    }
}
