//! Reference sources.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::reranker::ReferenceDocument;
use crate::{KnowledgeError, Result};

/// Supplies the base payload and candidate references.
#[async_trait]
pub trait ReferenceLoader: Send + Sync {
    /// Mandatory base payload. May be empty.
    async fn load_base(&self) -> Result<String>;

    /// Candidate reference documents. May be empty.
    async fn load_references(&self) -> Result<Vec<ReferenceDocument>>;
}

/// Skill directory layout: `SKILL.md` plus `references/*.md`.
#[derive(Debug, Clone)]
pub struct SkillDirectoryLoader {
    dir: PathBuf,
}

impl SkillDirectoryLoader {
    /// Base payload file name.
    pub const BASE_FILE: &'static str = "SKILL.md";
    /// Reference subdirectory name.
    pub const REFERENCES_DIR: &'static str = "references";

    /// Open a skill directory, failing if it does not exist.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(Self { dir }),
            _ => Err(KnowledgeError::SkillNotFound(dir)),
        }
    }

    /// Skill directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ReferenceLoader for SkillDirectoryLoader {
    async fn load_base(&self) -> Result<String> {
        let path = self.dir.join(Self::BASE_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(KnowledgeError::Read { path, source }),
        }
    }

    async fn load_references(&self) -> Result<Vec<ReferenceDocument>> {
        let dir = self.dir.join(Self::REFERENCES_DIR);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(KnowledgeError::Read { path: dir, source }),
        };

        let mut references = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| KnowledgeError::Read { path: dir.clone(), source })?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            // One unreadable reference does not sink the rest
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => references.push(ReferenceDocument { name, content }),
                Err(e) => warn!("Skipping reference {}: {}", path.display(), e),
            }
        }

        references.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(references)
    }
}

/// In-memory reference source.
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceLoader {
    base: String,
    references: Vec<ReferenceDocument>,
}

impl StaticReferenceLoader {
    /// Create a loader with a base payload and no references.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            references: Vec::new(),
        }
    }

    /// Add a reference.
    pub fn with_reference(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.references.push(ReferenceDocument::new(name, content));
        self
    }
}

#[async_trait]
impl ReferenceLoader for StaticReferenceLoader {
    async fn load_base(&self) -> Result<String> {
        Ok(self.base.clone())
    }

    async fn load_references(&self) -> Result<Vec<ReferenceDocument>> {
        Ok(self.references.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_skill_directory_layout() {
        let temp = TempDir::new().unwrap();
        let refs = temp.path().join("references");
        tokio::fs::create_dir(&refs).await.unwrap();
        tokio::fs::write(temp.path().join("SKILL.md"), "# Skill").await.unwrap();
        tokio::fs::write(refs.join("b.md"), "bravo").await.unwrap();
        tokio::fs::write(refs.join("a.md"), "alpha").await.unwrap();
        tokio::fs::write(refs.join("notes.txt"), "ignored").await.unwrap();

        let loader = SkillDirectoryLoader::open(temp.path()).await.unwrap();
        assert_eq!(loader.load_base().await.unwrap(), "# Skill");

        let references = loader.load_references().await.unwrap();
        let names: Vec<_> = references.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
        assert_eq!(references[0].content, "alpha");
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let temp = TempDir::new().unwrap();
        let loader = SkillDirectoryLoader::open(temp.path()).await.unwrap();
        assert_eq!(loader.load_base().await.unwrap(), "");
        assert!(loader.load_references().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_skill_directory() {
        let temp = TempDir::new().unwrap();
        let err = SkillDirectoryLoader::open(temp.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::SkillNotFound(_)));
    }
}
