//! crewline: multi-agent orchestration from the command line
//!
//! Usage:
//!   crewline                    - Interactive REPL with a fresh session
//!   crewline --session <id>     - Interactive REPL resuming session <id>
//!   crewline --query "<text>"   - Answer one query and exit
//!   crewline --eval             - Run the evaluation dataset for the roster
//!   crewline --help             - Show help

mod cli;

use crewline_core::evaluation::{self, EvaluationSummary};
use crewline_core::{
    Config, DelegationDecision, Evaluator, HttpLlmClient, Orchestrator, SpecialistRegistry,
    ToolManager,
};
use crewline_tools::register_default_tools;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq)]
enum RunMode {
    /// Interactive REPL, optionally resuming a stored session
    Repl { session: Option<String> },
    /// One-shot query
    Query(String),
    /// Evaluation dataset
    Eval,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_args(&args).map_err(|e| anyhow::anyhow!("{}\nRun `crewline --help` for usage.", e))?;

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("crewline {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt().with_env_filter(log_filter()?).init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!(
        model = %config.llm.model,
        roster = %config.orchestrator.roster,
        max_depth = config.orchestrator.max_depth,
        "Starting crewline"
    );

    let orchestrator = Arc::new(build_orchestrator(&config)?);

    match mode {
        RunMode::Repl { session } => cli::run_repl(&config, orchestrator, session).await,
        RunMode::Query(query) => run_query(&orchestrator, &query).await,
        RunMode::Eval => run_eval(&config, orchestrator).await,
        RunMode::Help | RunMode::Version => Ok(()),
    }
}

/// `RUST_LOG` plus an `info` default
fn log_filter() -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::from_default_env().add_directive("info".parse()?))
}

/// Parse command line arguments (without the program name)
fn parse_args(args: &[String]) -> Result<RunMode, String> {
    let mut iter = args.iter();
    let mut session = None;

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(RunMode::Help),
            "--version" | "-v" => return Ok(RunMode::Version),
            "--eval" => return Ok(RunMode::Eval),
            "--query" | "-q" => {
                let query = iter.next().ok_or("--query requires a value")?;
                return Ok(RunMode::Query(query.clone()));
            }
            "--session" | "-s" => {
                let id = iter.next().ok_or("--session requires a value")?;
                session = Some(id.clone());
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(RunMode::Repl { session })
}

fn print_help() {
    println!("crewline - multi-agent orchestration");
    println!();
    println!("Usage:");
    println!("  crewline                    Start the interactive REPL with a new session");
    println!("  crewline --session <id>     Resume (and keep saving) session <id>");
    println!("  crewline --query \"<text>\"   Answer one query, print the delegation chain, exit");
    println!("  crewline --eval             Run the built-in evaluation dataset");
    println!("  crewline --help             Show this help message");
    println!("  crewline --version          Show version");
    println!();
    println!("Configuration is read from ./crewline.toml when present, else the environment.");
    println!();
    println!("Environment Variables:");
    println!("  LLM_API_KEY          API key (OPENAI_API_KEY is also accepted)");
    println!("  LLM_MODEL            Model name");
    println!("  LLM_PROVIDER         Provider: openai or claude (default: openai)");
    println!("  LLM_BASE_URL         Custom API endpoint");
    println!("  CREWLINE_ROSTER      general or wealth_advisory (default: general)");
    println!("  CREWLINE_MAX_DEPTH   Delegation depth bound (default: 5)");
    println!("  SESSION_STORE        file or sqlite (default: file)");
    println!("  SESSION_DIR          Directory for file sessions");
    println!("  DB_PATH              SQLite database path");
    println!("  SERPAPI_KEY          Key for the search tools (optional)");
}

/// Wire the LLM client, tools and specialists for the configured roster
fn build_orchestrator(config: &Config) -> anyhow::Result<Orchestrator> {
    let roster = config.orchestrator.roster;

    let llm = Arc::new(
        HttpLlmClient::new(&config.llm, config.orchestrator.max_tokens)
            .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?,
    );

    let mut tool_manager = ToolManager::new();
    register_default_tools(&mut tool_manager, roster, &config.tools);
    tracing::info!(
        "Registered {} tools: {:?}",
        tool_manager.len(),
        tool_manager.tool_names()
    );

    let registry = SpecialistRegistry::from_roster(roster, llm.clone(), Arc::new(tool_manager));
    tracing::info!("Registered {} specialists: {:?}", registry.len(), registry.names());

    Ok(Orchestrator::new(
        llm,
        Arc::new(registry),
        roster,
        config.orchestrator.max_depth,
    ))
}

/// One line per hop, `from -> to: reason`
pub(crate) fn format_delegation_chain(history: &[DelegationDecision]) -> String {
    history
        .iter()
        .map(|d| format!("{} -> {}: {}", d.from_agent, d.to_agent, d.reason))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn run_query(orchestrator: &Orchestrator, query: &str) -> anyhow::Result<()> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Query is empty");
    }

    let outcome = orchestrator.run(query, None).await?;

    println!("{}", outcome.response);
    if !outcome.delegation_history.is_empty() {
        println!();
        println!("Delegation chain:");
        println!("{}", format_delegation_chain(&outcome.delegation_history));
    }

    Ok(())
}

async fn run_eval(config: &Config, orchestrator: Arc<Orchestrator>) -> anyhow::Result<()> {
    let scenarios = evaluation::dataset(config.orchestrator.roster);
    println!(
        "Running {} scenarios for the {} roster...",
        scenarios.len(),
        config.orchestrator.roster
    );

    let summary = Evaluator::new(orchestrator).run(&scenarios).await;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &EvaluationSummary) {
    println!();
    for (i, report) in summary.reports.iter().enumerate() {
        println!("{}. [{}] {}", i + 1, report.scenario_type, report.query);
        match &report.error {
            Some(error) => println!("   error: {}", error),
            None => println!(
                "   subtasks: {}, delegations: {}, agents: {}, recall: {:.2}",
                report.subtasks_count,
                report.delegation_count,
                report.agents_used.join(", "),
                report.recall
            ),
        }
    }

    println!();
    println!("Scenarios: {}", summary.reports.len());
    println!("Failures: {}", summary.failures);
    println!("Mean expected-agent recall: {:.2}", summary.mean_recall);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewline_core::{SubTask, TaskType};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(&[]).unwrap(), RunMode::Repl { session: None });
        assert_eq!(
            parse_args(&args(&["--session", "20240101_120000"])).unwrap(),
            RunMode::Repl { session: Some("20240101_120000".into()) }
        );
        assert_eq!(
            parse_args(&args(&["--query", "What is a bond?"])).unwrap(),
            RunMode::Query("What is a bond?".into())
        );
        assert_eq!(parse_args(&args(&["--eval"])).unwrap(), RunMode::Eval);
        assert_eq!(parse_args(&args(&["-h"])).unwrap(), RunMode::Help);
        assert_eq!(parse_args(&args(&["--version"])).unwrap(), RunMode::Version);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&["--query"])).is_err());
        assert!(parse_args(&args(&["--session"])).is_err());
        assert_eq!(
            parse_args(&args(&["--verbose"])).unwrap_err(),
            "Unknown argument: --verbose"
        );
    }

    #[test]
    fn test_log_filter_allows_info() {
        use tracing_subscriber::filter::LevelFilter;

        let hint = log_filter().unwrap().max_level_hint();
        assert!(matches!(hint, Some(level) if level >= LevelFilter::INFO));
    }

    #[test]
    fn test_format_delegation_chain() {
        let task = SubTask::new("task_1", "Check the rules", TaskType::Research);
        let history = vec![
            DelegationDecision {
                from_agent: "financial_advisor".into(),
                to_agent: "legal_advisor".into(),
                task: task.clone(),
                reason: "regulatory question".into(),
                confidence: 0.8,
            },
            DelegationDecision {
                from_agent: "legal_advisor".into(),
                to_agent: "research_specialist".into(),
                task,
                reason: "needs sources".into(),
                confidence: 0.7,
            },
        ];

        assert_eq!(
            format_delegation_chain(&history),
            "financial_advisor -> legal_advisor: regulatory question\n\
             legal_advisor -> research_specialist: needs sources"
        );
        assert_eq!(format_delegation_chain(&[]), "");
    }
}
