//! `workflow-sim` CLI entry-point.
//!
//! Available sub-commands:
//! - `simulate` — run a workflow graph JSON file through the simulator.
//! - `validate` — check a workflow graph JSON file for structural problems.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use engine::{CancellationToken, Graph, LogEntry, LogLevel, SimulatorConfig, WorkflowSimulator};
use nodes::{ActionResolver, HttpCatalog, HttpInvoker, StaticCatalog};

#[derive(Parser)]
#[command(
    name = "workflow-sim",
    about = "Simulate workflow graphs built in the workflow designer",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a workflow graph and print its log as it happens. Ctrl-C aborts.
    Simulate {
        /// Path to the `{ nodes, edges }` JSON file.
        path: PathBuf,
        /// Simulated processing time per step, in milliseconds.
        #[arg(long, env = "WORKFLOW_SIM_DELAY_MS")]
        delay_ms: Option<u64>,
        /// URL of the automation catalogue (`GET` returns a JSON list of actions).
        /// Without it, the built-in catalogue is used.
        #[arg(long, env = "WORKFLOW_SIM_CATALOG_URL")]
        catalog_url: Option<String>,
        /// Print the final result as JSON instead of a summary line.
        #[arg(long)]
        json: bool,
    },
    /// Validate a workflow graph JSON file.
    Validate {
        /// Path to the `{ nodes, edges }` JSON file.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate { path, delay_ms, catalog_url, json } => {
            let graph = load_graph(&path).await?;

            let resolver: Arc<dyn ActionResolver> = match catalog_url {
                Some(url) => {
                    info!("Using automation catalogue at {url}");
                    Arc::new(HttpCatalog::new(url))
                }
                None => Arc::new(StaticCatalog::builtin()),
            };

            let mut config = SimulatorConfig::default();
            if let Some(ms) = delay_ms {
                config.step_delay = Duration::from_millis(ms);
            }
            let simulator = WorkflowSimulator::new(resolver, Arc::new(HttpInvoker::new()));

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let result = simulator
                .run(
                    &graph,
                    |entry| {
                        if !json {
                            println!("{}", format_entry(entry));
                        }
                    },
                    |node_id, status| debug!(node_id, ?status, "node status"),
                    &cancel,
                    config.step_delay,
                )
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if result.was_cancelled() {
                eprintln!("Simulation cancelled.");
            }

            if !result.success {
                std::process::exit(1);
            }
        }
        Command::Validate { path } => {
            let graph = load_graph(&path).await?;

            match engine::validate_graph(&graph) {
                Ok(starts) => {
                    println!(
                        "Workflow is valid: {} nodes, {} edges, start nodes {starts:?}",
                        graph.nodes.len(),
                        graph.edges.len()
                    );
                }
                Err(e) => {
                    eprintln!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

async fn load_graph(path: &Path) -> anyhow::Result<Graph> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read file {}", path.display()))?;

    Graph::from_json(&content).with_context(|| format!("cannot parse {}", path.display()))
}

fn format_entry(entry: &LogEntry) -> String {
    let level = match entry.level {
        LogLevel::Info => "INFO ",
        LogLevel::Success => "OK   ",
        LogLevel::Error => "ERROR",
    };
    let time = entry.time.format("%H:%M:%S%.3f");

    match &entry.node_title {
        Some(title) => format!("{time} {level} [{title}] {}", entry.message),
        None => format!("{time} {level} {}", entry.message),
    }
}
