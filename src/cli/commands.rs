//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: execute the configured task and archive the result (default)
//! - config: print the resolved configuration

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use agentrun::config::Config;

/// agentrun - run an LLM agent task with rate-limit retries
#[derive(Parser, Debug)]
#[command(name = "agentrun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the task and write the report
    Run(RunArgs),

    /// Print the resolved configuration as YAML
    Config(RunArgs),
}

/// Per-invocation overrides of configuration values
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Task description handed to the agent
    #[arg(short, long)]
    pub task: Option<String>,

    /// Maximum number of attempts
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Seconds to wait after a rate-limited attempt
    #[arg(long)]
    pub backoff_secs: Option<u64>,

    /// Directory the report is written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,
}

impl RunArgs {
    /// Apply the overrides that were given on the command line
    pub fn apply(&self, config: &mut Config) {
        if let Some(task) = &self.task {
            config.task = task.clone();
        }
        if let Some(max_attempts) = self.max_attempts {
            config.retry.max_attempts = max_attempts;
        }
        if let Some(backoff_secs) = self.backoff_secs {
            config.retry.backoff_secs = backoff_secs;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
    }
}
