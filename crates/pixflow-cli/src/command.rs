//! Command implementations.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use pixflow_runtime::engine::{Engine, ExecutionContext};
use pixflow_runtime::graph::{NodeId, Prompt};
use pixflow_runtime::value::Slot;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_COMMAND;
use crate::config::EngineArgs;

/// Subcommands of the CLI.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Checks a prompt file without executing it.
    Validate {
        /// Path to the prompt JSON file.
        file: PathBuf,
    },

    /// Executes a prompt file and prints the outputs of every submitted node.
    Run {
        /// Path to the prompt JSON file.
        file: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },
}

/// How `run` prints its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Pretty-printed JSON document.
    Json,
    /// One line per node and output slot.
    Pretty,
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Validate { .. } => "validate",
            Command::Run { .. } => "run",
        }
    }

    /// Executes the command.
    pub async fn execute(&self, args: &EngineArgs) -> anyhow::Result<()> {
        let engine = Engine::new(args.to_engine_config()?);

        match self {
            Command::Validate { file } => {
                let prompt = load_prompt(file).await?;
                engine
                    .validate(&prompt)
                    .with_context(|| format!("prompt {} is invalid", file.display()))?;

                tracing::info!(
                    target: TRACING_TARGET_COMMAND,
                    file = %file.display(),
                    nodes = prompt.node_count(),
                    "Prompt is valid"
                );
                println!("ok: {} nodes", prompt.node_count());
                Ok(())
            }
            Command::Run { file, output } => {
                let prompt = load_prompt(file).await?;
                let ctx = engine
                    .execute(&prompt)
                    .await
                    .with_context(|| format!("failed to execute {}", file.display()))?;

                tracing::info!(
                    target: TRACING_TARGET_COMMAND,
                    file = %file.display(),
                    generations = ctx.generations().len(),
                    nodes_executed = ctx.nodes_executed(),
                    waves = ctx.waves(),
                    "Prompt executed"
                );

                let report = RunReport::new(&prompt, &ctx);
                let mut stdout = std::io::stdout().lock();
                match output {
                    OutputFormat::Json => {
                        serde_json::to_writer_pretty(&mut stdout, &report)
                            .context("failed to write report")?;
                        writeln!(stdout)?;
                    }
                    OutputFormat::Pretty => report.write_pretty(&mut stdout)?,
                }
                Ok(())
            }
        }
    }
}

/// Reads and parses a prompt file.
async fn load_prompt(path: &Path) -> anyhow::Result<Prompt> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Summary of one execution, keyed by submitted node.
#[derive(Debug, Serialize)]
struct RunReport {
    nodes: BTreeMap<NodeId, NodeReport>,
    generations: usize,
    nodes_executed: usize,
    waves: usize,
}

#[derive(Debug, Serialize)]
struct NodeReport {
    class_type: String,
    executions: usize,
    skipped: bool,
    outputs: Vec<Slot>,
}

impl RunReport {
    fn new(prompt: &Prompt, ctx: &ExecutionContext) -> Self {
        let nodes = prompt
            .nodes
            .iter()
            .map(|(&id, node)| {
                let report = NodeReport {
                    class_type: node.class_type.clone(),
                    executions: ctx.executions_of(id),
                    skipped: ctx.is_skipped(id),
                    outputs: ctx.outputs(id).unwrap_or_default(),
                };
                (id, report)
            })
            .collect();

        Self {
            nodes,
            generations: ctx.generations().len(),
            nodes_executed: ctx.nodes_executed(),
            waves: ctx.waves(),
        }
    }

    fn write_pretty(&self, out: &mut impl Write) -> anyhow::Result<()> {
        for (id, node) in &self.nodes {
            let state = if node.skipped { "skipped" } else { "ran" };
            writeln!(
                out,
                "{id} {} ({state}, {} executions)",
                node.class_type, node.executions
            )?;
            for (slot, output) in node.outputs.iter().enumerate() {
                match output {
                    Slot::Ready(value) => {
                        writeln!(out, "  [{slot}] {}", serde_json::to_string(value)?)?
                    }
                    Slot::Blocked => writeln!(out, "  [{slot}] blocked")?,
                }
            }
        }
        writeln!(
            out,
            "{} generations, {} node executions, {} waves",
            self.generations, self.nodes_executed, self.waves
        )?;
        Ok(())
    }
}
