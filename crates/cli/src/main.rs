//! Sovereign CLI - quality-tracked task runs and context packing.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use sovereign_config::SovereignConfig;
use sovereign_core::{ContextMap, DimensionScores};
use sovereign_evolution::EvolutionEngine;
use sovereign_execution::{domain_engine, placeholder_signals, MetaCognitivePipeline, PolicyResolver, StaticExecutor};
use sovereign_knowledge::{ContextOptimizer, ModeSelection, SkillDirectoryLoader};
use sovereign_quality::{DimensionRegistry, GovernanceThresholds};
use sovereign_storage::{HistoryStorage, JsonHistoryStorage};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sovereign")]
#[command(about = "Meta-cognitive task runs with quality tracking", long_about = None)]
struct Cli {
    /// Config file (default: ./sovereign.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evolution history directory
    #[arg(long, global = true)]
    meta_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Measured signal, repeatable (e.g. --score correctness=0.9)
    #[arg(long = "score", value_parser = parse_score)]
    scores: Vec<(String, f64)>,

    /// Priority (1-10)
    #[arg(long)]
    priority: Option<u8>,

    /// Override the complexity heuristic
    #[arg(long)]
    complexity: Option<f64>,

    /// Skill directory to pack reference material from
    #[arg(long)]
    skill_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a code generation task
    Code {
        /// Task description
        task: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run a debugging task
    Debug {
        /// File to debug
        file: String,
        /// Issue description
        issue: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run a refactoring task
    Refactor {
        /// File to refactor
        file: String,
        /// Refactoring goal
        goal: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Select and pack reference material for a query
    Optimize {
        /// Skill directory or name under the configured skills dir
        skill_dir: PathBuf,
        /// Task query
        query: String,
        /// Task complexity (0-1)
        #[arg(long, default_value_t = 0.5)]
        complexity: f64,
        /// auto, minimal, balanced or strict
        #[arg(long, default_value = "auto", value_parser = parse_mode)]
        mode: ModeSelection,
    },
    /// Summarize evolution history for every domain
    Status,
    /// Show the cycle history of a domain
    History {
        /// Domain name
        domain: String,
    },
    /// Check governance metrics against thresholds
    Governance {
        /// Drift score
        #[arg(long)]
        drift: Option<f64>,
        /// Omega score
        #[arg(long)]
        omega: Option<f64>,
        /// Compliance score
        #[arg(long)]
        compliance: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = SovereignConfig::load(cli.config.as_deref())?;
    if let Some(meta_dir) = cli.meta_dir {
        config.meta_dir = meta_dir;
    }

    match cli.command {
        Commands::Code { task, run } => {
            run_domain(&config, "code", &task, ContextMap::new(), run).await?;
        }
        Commands::Debug { file, issue, run } => {
            let mut context = ContextMap::new();
            context.insert("file".to_string(), json!(file));
            run_domain(&config, "debug", &issue, context, run).await?;
        }
        Commands::Refactor { file, goal, run } => {
            let mut context = ContextMap::new();
            context.insert("file".to_string(), json!(file));
            run_domain(&config, "refactor", &goal, context, run).await?;
        }
        Commands::Optimize { skill_dir, query, complexity, mode } => {
            let optimizer = optimizer_for(&config, &resolve_skill_dir(&config, &skill_dir)).await?;
            let optimized = optimizer.optimize_context(&query, complexity, mode).await?;
            info!(
                "Packed {} of {} tokens in {} mode",
                optimized.total_tokens, optimized.budget_tokens, optimized.mode
            );
            print_json(&optimized)?;
        }
        Commands::Status => {
            let storage = open_storage(&config).await?;
            let registry = DimensionRegistry::builtin();
            let mut domains: Vec<String> = registry.domains().iter().map(|d| d.to_string()).collect();
            for domain in storage.list_domains().await? {
                if !domains.contains(&domain) {
                    domains.push(domain);
                }
            }

            let mut summaries = Vec::new();
            for domain in domains {
                let engine = EvolutionEngine::open(storage.clone(), domain, config.evolution.clone()).await;
                summaries.push(engine.summary());
            }
            print_json(&summaries)?;
        }
        Commands::History { domain } => {
            let storage = open_storage(&config).await?;
            let engine = EvolutionEngine::open(storage, domain, config.evolution.clone()).await;
            print_json(&engine.history())?;
        }
        Commands::Governance { drift, omega, compliance } => {
            let metrics: BTreeMap<String, f64> = [("drift_score", drift), ("omega_score", omega), ("compliance", compliance)]
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
                .collect();
            let report = GovernanceThresholds::default().validate(&metrics);
            print_json(&report)?;
            if !report.compliant {
                anyhow::bail!("Governance check failed with {} violation(s)", report.violations.len());
            }
        }
    }

    Ok(())
}

async fn run_domain(
    config: &SovereignConfig,
    domain: &str,
    input: &str,
    mut context: ContextMap,
    run: RunArgs,
) -> Result<()> {
    let signals: DimensionScores = if run.scores.is_empty() {
        placeholder_signals(domain).unwrap_or_default()
    } else {
        run.scores.into_iter().collect()
    };
    if let Some(priority) = run.priority {
        context.insert("priority".to_string(), json!(priority));
    }
    if let Some(complexity) = run.complexity {
        context.insert("complexity".to_string(), json!(complexity));
    }

    let engine = domain_engine(domain, Arc::new(StaticExecutor::new(signals)))
        .with_context(|| format!("Unknown domain: {}", domain))?;
    let storage = open_storage(config).await?;

    let mut pipeline = MetaCognitivePipeline::open(engine, storage, config.evolution.clone())
        .await
        .with_resolver(PolicyResolver::new(config.budgets));
    if let Some(dir) = run.skill_dir {
        pipeline = pipeline.with_optimizer(optimizer_for(config, &resolve_skill_dir(config, &dir)).await?);
    }

    let report = pipeline.execute(input, context).await;
    print_json(&report)?;

    if !report.success {
        anyhow::bail!("Run {} did not succeed", report.run_id);
    }
    Ok(())
}

async fn open_storage(config: &SovereignConfig) -> Result<Arc<dyn HistoryStorage>> {
    let storage = JsonHistoryStorage::new(&config.meta_dir)
        .await
        .with_context(|| format!("Failed to open history at {}", config.meta_dir.display()))?;
    Ok(Arc::new(storage))
}

async fn optimizer_for(config: &SovereignConfig, dir: &Path) -> Result<ContextOptimizer> {
    let loader = SkillDirectoryLoader::open(dir).await?;
    Ok(ContextOptimizer::new(Arc::new(loader))
        .with_reranker(&config.reranker)
        .with_packer(&config.packer)
        .with_budgets(config.budgets))
}

/// Paths that do not exist are looked up under the configured skills dir.
fn resolve_skill_dir(config: &SovereignConfig, dir: &Path) -> PathBuf {
    if dir.exists() {
        dir.to_path_buf()
    } else {
        config.skills_dir.join(dir)
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_score(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {:?}", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid score for {}: {:?}", name, value))?;
    Ok((name.trim().to_string(), value))
}

fn parse_mode(s: &str) -> std::result::Result<ModeSelection, String> {
    s.parse().map_err(|e: sovereign_core::ParseModeError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sovereign_core::RuntimeMode;

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("correctness=0.9").unwrap(), ("correctness".to_string(), 0.9));
        assert!(parse_score("correctness").is_err());
        assert!(parse_score("correctness=high").is_err());
    }

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "sovereign",
            "--meta-dir",
            "/tmp/meta",
            "debug",
            "src/auth.rs",
            "Null pointer on login",
            "--score",
            "root_cause_accuracy=0.9",
            "--score",
            "regression_risk=0.1",
            "--priority",
            "7",
        ])
        .unwrap();

        assert_eq!(cli.meta_dir, Some(PathBuf::from("/tmp/meta")));
        match cli.command {
            Commands::Debug { file, issue, run } => {
                assert_eq!(file, "src/auth.rs");
                assert_eq!(issue, "Null pointer on login");
                assert_eq!(run.scores.len(), 2);
                assert_eq!(run.priority, Some(7));
            }
            _ => panic!("expected debug command"),
        }
    }

    #[test]
    fn test_parse_optimize_mode() {
        let cli = Cli::try_parse_from(["sovereign", "optimize", "skills/code", "redis cache", "--mode", "strict"]).unwrap();
        match cli.command {
            Commands::Optimize { mode, complexity, .. } => {
                assert_eq!(mode, ModeSelection::Fixed(RuntimeMode::Strict));
                assert_eq!(complexity, 0.5);
            }
            _ => panic!("expected optimize command"),
        }

        assert!(Cli::try_parse_from(["sovereign", "optimize", "x", "q", "--mode", "turbo"]).is_err());
    }
}
