//! Hybrid lexical + token-overlap reranker.
//!
//! Combined score is `alpha * lexical + (1 - alpha) * jaccard` where lexical
//! is the mean term frequency of the distinct query tokens in the document.

use serde::Serialize;
use sovereign_core::RerankerConfig;
use std::collections::HashSet;

/// A named candidate document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDocument {
    /// Document name (usually a file name)
    pub name: String,

    /// Document text
    pub content: String,
}

impl ReferenceDocument {
    /// Create a document.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A document with its combined relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedReference {
    /// Document name
    pub name: String,

    /// Document text
    #[serde(skip)]
    pub content: String,

    /// Combined score
    pub score: f64,
}

/// Hybrid reranker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridReranker {
    alpha: f64,
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

fn distinct(tokens: &[String]) -> HashSet<&str> {
    tokens.iter().map(String::as_str).collect()
}

impl HybridReranker {
    /// Create a reranker. `alpha` is clamped to [0, 1].
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Create a reranker from configuration.
    pub fn from_config(config: &RerankerConfig) -> Self {
        Self::new(config.alpha)
    }

    /// Lexical weight.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Mean term frequency of the distinct query tokens in the document.
    pub fn lexical_score(&self, query: &str, document: &str) -> f64 {
        let query_tokens = tokenize(query);
        let doc_tokens = tokenize(document);
        let terms = distinct(&query_tokens);
        if terms.is_empty() || doc_tokens.is_empty() {
            return 0.0;
        }

        let doc_len = doc_tokens.len() as f64;
        let total: f64 = terms
            .iter()
            .map(|term| doc_tokens.iter().filter(|t| t.as_str() == *term).count() as f64 / doc_len)
            .sum();
        total / terms.len() as f64
    }

    /// Jaccard similarity of the query and document token sets.
    pub fn overlap_score(&self, query: &str, document: &str) -> f64 {
        let query_tokens = tokenize(query);
        let doc_tokens = tokenize(document);
        let q = distinct(&query_tokens);
        let d = distinct(&doc_tokens);
        if q.is_empty() || d.is_empty() {
            return 0.0;
        }

        let intersection = q.intersection(&d).count() as f64;
        let union = q.union(&d).count() as f64;
        intersection / union
    }

    /// Combined score.
    pub fn score(&self, query: &str, document: &str) -> f64 {
        self.alpha * self.lexical_score(query, document)
            + (1.0 - self.alpha) * self.overlap_score(query, document)
    }

    /// Rank candidates by combined score and keep the best `top_k`.
    ///
    /// Ties keep their input order.
    pub fn rank_references(
        &self,
        query: &str,
        references: &[ReferenceDocument],
        top_k: usize,
    ) -> Vec<RankedReference> {
        let mut ranked: Vec<RankedReference> = references
            .iter()
            .map(|doc| RankedReference {
                name: doc.name.clone(),
                content: doc.content.clone(),
                score: self.score(query, &doc.content),
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(top_k);
        ranked
    }
}

impl Default for HybridReranker {
    fn default() -> Self {
        Self::from_config(&RerankerConfig::default())
    }
}
