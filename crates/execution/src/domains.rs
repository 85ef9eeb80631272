//! Built-in `code`, `debug` and `refactor` domains.
//!
//! Complexity is a keyword heuristic over the task text. A numeric
//! `complexity` entry in the caller context replaces the heuristic as given,
//! so out-of-range values still reach validation.

use async_trait::async_trait;
use sovereign_core::{ContextMap, ExecutionPlan, Intent};
use sovereign_knowledge::OptimizedContext;
use sovereign_quality::DomainProfile;
use std::sync::Arc;

use crate::domain::DomainEngine;
use crate::executor::{TaskExecutor, TaskOutcome};

fn base_intent(task: String, domain: &str, context: &ContextMap) -> Intent {
    let mut intent = Intent::new(task, domain).with_context(context.clone());
    if let Some(priority) = context.get("priority").and_then(|v| v.as_u64()) {
        intent = intent.with_priority(priority.min(u8::MAX as u64) as u8);
    }
    if let Some(target) = context.get("quality_target").and_then(|v| v.as_str()) {
        intent = intent.with_quality_target(target);
    }
    intent
}

/// `"<verb> <file>: <detail>"` when a file is given, else the detail alone.
/// Blank input stays blank so validation can reject it.
fn file_task(verb: &str, user_input: &str, context: &ContextMap) -> String {
    let detail = user_input.trim();
    match context.get("file").and_then(|v| v.as_str()) {
        Some(file) if !detail.is_empty() => format!("{} {}: {}", verb, file, detail),
        _ => detail.to_string(),
    }
}

fn keyword_complexity(text: &str, base: f64, keywords: &[&str], per_hit: f64) -> f64 {
    let lower = text.to_lowercase();
    let hits = keywords.iter().filter(|k| lower.contains(*k)).count() as f64;
    let length = (text.split_whitespace().count() as f64 / 100.0).min(0.2);
    (base + hits * per_hit + length).min(1.0)
}

fn context_complexity(intent: &Intent) -> Option<f64> {
    intent.user_context.get("complexity").and_then(|v| v.as_f64())
}

/// Code generation.
pub struct CodeDomain {
    profile: DomainProfile,
    executor: Arc<dyn TaskExecutor>,
}

impl CodeDomain {
    const KEYWORDS: &'static [&'static str] = &[
        "distributed",
        "concurren",
        "async",
        "security",
        "auth",
        "database",
        "cache",
        "migration",
        "performance",
        "protocol",
        "api",
    ];

    /// Create the domain around an executor.
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            profile: DomainProfile::code(),
            executor,
        }
    }
}

#[async_trait]
impl DomainEngine for CodeDomain {
    fn domain(&self) -> &str {
        "code"
    }

    fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    fn analyze_intent(&self, user_input: &str, context: &ContextMap) -> Intent {
        base_intent(user_input.trim().to_string(), "code", context)
    }

    fn calculate_complexity(&self, intent: &Intent) -> f64 {
        context_complexity(intent)
            .unwrap_or_else(|| keyword_complexity(&intent.task, 0.2, Self::KEYWORDS, 0.1))
    }

    async fn execute_task(
        &self,
        plan: &ExecutionPlan,
        intent: &Intent,
        context: Option<&OptimizedContext>,
    ) -> anyhow::Result<TaskOutcome> {
        self.executor.execute(plan, intent, context).await
    }
}

/// Debugging.
pub struct DebugDomain {
    profile: DomainProfile,
    executor: Arc<dyn TaskExecutor>,
}

impl DebugDomain {
    const KEYWORDS: &'static [&'static str] = &[
        "race",
        "deadlock",
        "leak",
        "intermittent",
        "production",
        "crash",
        "corrupt",
        "timeout",
        "concurren",
    ];

    /// Create the domain around an executor.
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            profile: DomainProfile::debug(),
            executor,
        }
    }
}

#[async_trait]
impl DomainEngine for DebugDomain {
    fn domain(&self) -> &str {
        "debug"
    }

    fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    fn analyze_intent(&self, user_input: &str, context: &ContextMap) -> Intent {
        base_intent(file_task("Debug", user_input, context), "debug", context)
    }

    fn calculate_complexity(&self, intent: &Intent) -> f64 {
        context_complexity(intent)
            .unwrap_or_else(|| keyword_complexity(&intent.task, 0.3, Self::KEYWORDS, 0.15))
    }

    async fn execute_task(
        &self,
        plan: &ExecutionPlan,
        intent: &Intent,
        context: Option<&OptimizedContext>,
    ) -> anyhow::Result<TaskOutcome> {
        self.executor.execute(plan, intent, context).await
    }
}

/// Refactoring.
pub struct RefactorDomain {
    profile: DomainProfile,
    executor: Arc<dyn TaskExecutor>,
}

impl RefactorDomain {
    const KEYWORDS: &'static [&'static str] = &[
        "architecture",
        "module",
        "extract",
        "split",
        "interface",
        "legacy",
        "dependenc",
        "coupling",
        "layer",
    ];

    /// Create the domain around an executor.
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            profile: DomainProfile::refactor(),
            executor,
        }
    }
}

#[async_trait]
impl DomainEngine for RefactorDomain {
    fn domain(&self) -> &str {
        "refactor"
    }

    fn profile(&self) -> &DomainProfile {
        &self.profile
    }

    fn analyze_intent(&self, user_input: &str, context: &ContextMap) -> Intent {
        base_intent(file_task("Refactor", user_input, context), "refactor", context)
    }

    fn calculate_complexity(&self, intent: &Intent) -> f64 {
        context_complexity(intent)
            .unwrap_or_else(|| keyword_complexity(&intent.task, 0.25, Self::KEYWORDS, 0.1))
    }

    async fn execute_task(
        &self,
        plan: &ExecutionPlan,
        intent: &Intent,
        context: Option<&OptimizedContext>,
    ) -> anyhow::Result<TaskOutcome> {
        self.executor.execute(plan, intent, context).await
    }
}

/// Look up a built-in domain by name.
pub fn domain_engine(domain: &str, executor: Arc<dyn TaskExecutor>) -> Option<Arc<dyn DomainEngine>> {
    match domain {
        "code" => Some(Arc::new(CodeDomain::new(executor))),
        "debug" => Some(Arc::new(DebugDomain::new(executor))),
        "refactor" => Some(Arc::new(RefactorDomain::new(executor))),
        _ => None,
    }
}
