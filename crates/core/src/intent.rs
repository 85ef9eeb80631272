//! Intent model - what a single pipeline run is asked to do.

use serde::{Deserialize, Serialize};

/// Free-form context supplied alongside a task.
pub type ContextMap = serde_json::Map<String, serde_json::Value>;

/// A task intent, created once per pipeline run.
///
/// Domain engines build the intent during `analyze_intent`; the pipeline then
/// fixes its complexity with [`Intent::with_complexity`] and treats it as
/// immutable from there on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    /// What to do
    pub task: String,

    /// Which domain (code, debug, refactor, ...)
    pub domain: String,

    /// Caller supplied context
    #[serde(default)]
    pub user_context: ContextMap,

    /// Task complexity, 0-1
    pub complexity: f64,

    /// Priority, 1-10
    pub priority: u8,

    /// Target quality label
    pub quality_target: String,
}

impl Intent {
    /// Default priority for new intents.
    pub const DEFAULT_PRIORITY: u8 = 5;

    /// Create a new intent with default priority and quality target.
    pub fn new(task: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            domain: domain.into(),
            user_context: ContextMap::new(),
            complexity: 0.0,
            priority: Self::DEFAULT_PRIORITY,
            quality_target: "A-grade".to_string(),
        }
    }

    /// Attach caller context.
    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.user_context = context;
        self
    }

    /// Set priority, clamped to 1-10.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(1, 10);
        self
    }

    /// Set the quality target label.
    pub fn with_quality_target(mut self, target: impl Into<String>) -> Self {
        self.quality_target = target.into();
        self
    }

    /// Fix the computed complexity.
    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }

    /// Whether the task string carries any content.
    pub fn has_task(&self) -> bool {
        !self.task.trim().is_empty()
    }
}

/// Result of the validation phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the run may proceed
    pub valid: bool,

    /// Confidence in the intent, 0-1
    pub confidence: f64,

    /// Non-fatal findings
    pub warnings: Vec<String>,

    /// Fatal findings
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    /// A passing outcome with the default confidence.
    pub fn valid() -> Self {
        Self {
            valid: true,
            confidence: 0.95,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record a fatal error; the outcome becomes invalid.
    pub fn reject(&mut self, error: impl Into<String>) {
        self.valid = false;
        self.confidence = 0.0;
        self.errors.push(error.into());
    }

    /// Record a warning.
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self::valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_defaults() {
        let intent = Intent::new("Create Redis cache layer", "code");
        assert_eq!(intent.priority, 5);
        assert_eq!(intent.quality_target, "A-grade");
        assert_eq!(intent.complexity, 0.0);
        assert!(intent.user_context.is_empty());
    }

    #[test]
    fn test_intent_priority_is_clamped() {
        assert_eq!(Intent::new("t", "code").with_priority(0).priority, 1);
        assert_eq!(Intent::new("t", "code").with_priority(42).priority, 10);
    }

    #[test]
    fn test_has_task_ignores_whitespace() {
        assert!(!Intent::new("   ", "code").has_task());
        assert!(Intent::new("fix it", "debug").has_task());
    }

    #[test]
    fn test_validation_reject() {
        let mut outcome = ValidationOutcome::valid();
        outcome.warn("odd complexity");
        assert!(outcome.valid);

        outcome.reject("Empty task");
        assert!(!outcome.valid);
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.errors, vec!["Empty task".to_string()]);
        assert_eq!(outcome.warnings.len(), 1);
    }
}
