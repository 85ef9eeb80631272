//! Reference knowledge selection.
//!
//! Ranks auxiliary reference documents against a task query and packs the
//! best of them behind a mandatory base payload under a token budget.

#![warn(missing_docs)]

pub mod reranker;
pub mod packer;
pub mod loader;
pub mod optimizer;

pub use reranker::{HybridReranker, ReferenceDocument, RankedReference};
pub use packer::{BudgetPacker, TokenEstimator, PackedContext};
pub use loader::{ReferenceLoader, SkillDirectoryLoader, StaticReferenceLoader};
pub use optimizer::{ContextOptimizer, ModeSelection, OptimizedContext, DELEGATION_MARKER};

use std::path::PathBuf;

/// Error type for knowledge operations.
pub type Result<T> = std::result::Result<T, KnowledgeError>;

/// Knowledge errors.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    /// Skill directory does not exist
    #[error("Skill not found: {0}")]
    SkillNotFound(PathBuf),

    /// Reading a reference source failed
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}
