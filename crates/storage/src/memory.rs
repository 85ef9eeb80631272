//! In-memory history storage.
//!
//! Keeps the encoded JSON text per domain so that decoding behaves exactly
//! like the file backend, including on malformed input.

use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{HistoryStorage, HistoryDocument, Result};
use crate::locks::{DomainGuard, DomainLocks};
use crate::trait_::check_domain;

/// Memory-backed history storage.
#[derive(Debug, Default)]
pub struct MemoryHistoryStorage {
    documents: Mutex<HashMap<String, String>>,
    locks: DomainLocks,
    saves: Mutex<usize>,
}

impl MemoryHistoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text for a domain, bypassing encoding.
    pub async fn insert_raw(&self, domain: impl Into<String>, text: impl Into<String>) {
        self.documents.lock().await.insert(domain.into(), text.into());
    }

    /// Raw stored text for a domain.
    pub async fn raw(&self, domain: &str) -> Option<String> {
        self.documents.lock().await.get(domain).cloned()
    }

    /// Number of successful saves.
    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl HistoryStorage for MemoryHistoryStorage {
    async fn load_history(&self, domain: &str) -> Result<Option<HistoryDocument>> {
        check_domain(domain)?;
        match self.documents.lock().await.get(domain) {
            Some(text) => Ok(Some(HistoryDocument::decode(text)?)),
            None => Ok(None),
        }
    }

    async fn save_history(&self, document: &HistoryDocument) -> Result<()> {
        check_domain(&document.domain)?;
        let text = document.encode()?;
        self.documents.lock().await.insert(document.domain.clone(), text);
        *self.saves.lock().await += 1;
        Ok(())
    }

    async fn list_domains(&self) -> Result<Vec<String>> {
        let mut domains: Vec<_> = self.documents.lock().await.keys().cloned().collect();
        domains.sort();
        Ok(domains)
    }

    async fn lock_domain(&self, domain: &str) -> Result<DomainGuard> {
        self.locks.acquire(domain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_load() {
        let storage = MemoryHistoryStorage::new();
        let doc = HistoryDocument::new("code", vec![]);
        storage.save_history(&doc).await.unwrap();

        assert_eq!(storage.load_history("code").await.unwrap(), Some(doc));
        assert_eq!(storage.save_count().await, 1);
        assert_eq!(storage.list_domains().await.unwrap(), vec!["code"]);
    }

    #[tokio::test]
    async fn test_raw_garbage_fails_to_decode() {
        let storage = MemoryHistoryStorage::new();
        storage.insert_raw("code", "not json at all").await;
        assert!(storage.load_history("code").await.is_err());
    }
}
