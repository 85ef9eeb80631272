//! History storage trait abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sovereign_core::EvolutionCycle;

use crate::locks::DomainGuard;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Domain name cannot be used as a storage key
    #[error("Invalid domain name: {0:?}")]
    InvalidDomain(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Persisted evolution history for one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryDocument {
    /// Domain name
    pub domain: String,

    /// Format version
    pub version: String,

    /// Number of cycles; always equals `cycles.len()` when written by us
    pub total_cycles: usize,

    /// Ordered cycle records
    #[serde(default)]
    pub cycles: Vec<EvolutionCycle>,
}

impl HistoryDocument {
    /// Current format version.
    pub const VERSION: &'static str = "1.0.0";

    /// Build a document from an ordered cycle sequence.
    pub fn new(domain: impl Into<String>, cycles: Vec<EvolutionCycle>) -> Self {
        Self {
            domain: domain.into(),
            version: Self::VERSION.to_string(),
            total_cycles: cycles.len(),
            cycles,
        }
    }

    /// Parse a document from its JSON text.
    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the document as pretty JSON.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Storage for per-domain evolution history.
///
/// Documents are always written whole; there is no incremental patching.
#[async_trait]
pub trait HistoryStorage: Send + Sync {
    /// Load the history for a domain, `None` if nothing was persisted yet.
    async fn load_history(&self, domain: &str) -> Result<Option<HistoryDocument>>;

    /// Replace the persisted history for `document.domain`.
    async fn save_history(&self, document: &HistoryDocument) -> Result<()>;

    /// List domains with persisted history.
    async fn list_domains(&self) -> Result<Vec<String>>;

    /// Acquire the write lock for a domain.
    ///
    /// Holders must keep the guard alive across load-append-save so that
    /// concurrent appends to the same domain are serialized, including
    /// appends from other processes where the backend supports it.
    async fn lock_domain(&self, domain: &str) -> Result<DomainGuard>;
}

/// Reject domain names that would escape the storage root.
pub(crate) fn check_domain(domain: &str) -> Result<()> {
    let bad = domain.is_empty()
        || domain.contains(['/', '\\'])
        || domain == "."
        || domain == "..";
    if bad {
        return Err(StorageError::InvalidDomain(domain.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_counts_cycles() {
        let doc = HistoryDocument::new("code", Vec::new());
        assert_eq!(doc.total_cycles, 0);
        assert_eq!(doc.version, "1.0.0");
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(matches!(HistoryDocument::decode("{not json"), Err(StorageError::Json(_))));
        assert!(HistoryDocument::decode(r#"{"domain":"code"}"#).is_err());
    }

    #[test]
    fn test_check_domain() {
        assert!(check_domain("code").is_ok());
        assert!(check_domain("my-domain_2").is_ok());
        assert!(check_domain("").is_err());
        assert!(check_domain("../etc").is_err());
        assert!(check_domain("..").is_err());
    }
}
