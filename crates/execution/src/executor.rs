//! Task executor seam.
//!
//! Actual task work (generating, debugging, refactoring) happens outside this
//! crate. Executors return an opaque output plus the raw quality signals the
//! domain turns into dimension scores.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use sovereign_core::{DimensionScores, ExecutionPlan, Intent};
use sovereign_knowledge::OptimizedContext;

/// Result of executing a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskOutcome {
    /// Opaque task output
    pub output: serde_json::Value,

    /// Raw quality signals by dimension name
    pub signals: DimensionScores,
}

/// Performs the actual task.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Execute `plan` for `intent`. `context` carries packed reference
    /// material when a context optimizer is attached.
    async fn execute(
        &self,
        plan: &ExecutionPlan,
        intent: &Intent,
        context: Option<&OptimizedContext>,
    ) -> anyhow::Result<TaskOutcome>;
}

/// Executor that reports a fixed set of signals.
#[derive(Debug, Clone, Default)]
pub struct StaticExecutor {
    signals: DimensionScores,
}

impl StaticExecutor {
    /// Create an executor reporting `signals` for every task.
    pub fn new(signals: DimensionScores) -> Self {
        Self { signals }
    }
}

#[async_trait]
impl TaskExecutor for StaticExecutor {
    async fn execute(
        &self,
        plan: &ExecutionPlan,
        intent: &Intent,
        context: Option<&OptimizedContext>,
    ) -> anyhow::Result<TaskOutcome> {
        let output = json!({
            "domain": intent.domain,
            "task": intent.task,
            "steps": plan.actions(),
            "references": context.map(|c| c.included_references.clone()).unwrap_or_default(),
        });

        Ok(TaskOutcome {
            output,
            signals: self.signals.clone(),
        })
    }
}

/// Representative raw signals for the built-in domains.
///
/// Used when the caller has no measured signals of its own.
pub fn placeholder_signals(domain: &str) -> Option<DimensionScores> {
    let pairs: &[(&str, f64)] = match domain {
        "code" => &[
            ("correctness", 0.90),
            ("readability", 0.85),
            ("performance", 0.88),
            ("security", 0.92),
            ("maintainability", 0.87),
        ],
        "debug" => &[
            ("root_cause_accuracy", 0.92),
            ("fix_effectiveness", 0.88),
            ("regression_risk", 0.15),
            ("time_efficiency", 0.85),
            ("learning", 0.90),
        ],
        "refactor" => &[
            ("simplicity", 0.88),
            ("cohesion", 0.90),
            ("coupling", 0.20),
            ("testability", 0.85),
            ("performance", 0.92),
        ],
        _ => return None,
    };
    Some(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_signals() {
        assert_eq!(placeholder_signals("code").unwrap().len(), 5);
        assert_eq!(placeholder_signals("debug").unwrap()["regression_risk"], 0.15);
        assert!(placeholder_signals("docs").is_none());
    }
}
