use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use agentrun::agent::LlmAgent;
use agentrun::archive::ResultArchiver;
use agentrun::config::{Config, Credentials};
use agentrun::domain::RunOutcome;
use agentrun::llm::{GeminiClient, GeminiConfig};
use agentrun::runner::{FailureReport, RetryDecision, RetryPolicy, RunObserver, TaskRunner};
use cli::{Cli, Commands, RunArgs};

fn setup_logging(default_level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agentrun")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("agentrun.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Prints a colored status line for every failed attempt.
struct ConsoleObserver;

impl RunObserver for ConsoleObserver {
    fn attempt_failed(&self, report: &FailureReport<'_>) {
        println!(
            "{} {}/{} failed ({}): {}",
            "Attempt".yellow(),
            report.attempt,
            report.max_attempts,
            report.error.kind,
            report.error
        );
        if let RetryDecision::Retry(backoff) = report.decision {
            println!("{} {}s...", "Rate limited; retrying in".yellow(), backoff.as_secs());
        }
    }
}

fn resolve_config(cli: &Cli, args: &RunArgs) -> Result<Config> {
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run_application(cli: &Cli, config: Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None | Some(Commands::Run(_)) => handle_run_command(cli, config).await,
        Some(Commands::Config(_)) => handle_config_command(&config),
    }
}

async fn handle_run_command(cli: &Cli, config: Config) -> Result<()> {
    let credentials = Credentials::from_env()?;

    let llm_config = GeminiConfig {
        model: config.llm.model.clone(),
        max_tokens: config.llm.max_output_tokens,
        timeout: config.llm_timeout(),
    };
    let client = Arc::new(GeminiClient::new(&credentials, llm_config)?);
    let agent = LlmAgent::new(client.clone(), config.task.clone(), config.retry.rate_limit_marker.clone());

    info!("Running task: {}", agent.task());
    println!("{} {}", "Task:".green(), agent.task());
    if cli.is_verbose() {
        println!(
            "  model={} max_attempts={} backoff={}s",
            config.llm.model, config.retry.max_attempts, config.retry.backoff_secs
        );
    }

    let policy = RetryPolicy::new(config.retry.max_attempts, config.retry.backoff());
    let outcome = TaskRunner::new(policy).with_observer(ConsoleObserver).run(&agent).await;

    let usage = client.total_usage();
    info!(
        "Token usage: {} input, {} output, {} total",
        usage.input_tokens,
        usage.output_tokens,
        usage.total()
    );
    if cli.is_verbose() {
        println!("  tokens: {} in / {} out", usage.input_tokens, usage.output_tokens);
    }

    let archiver = ResultArchiver::new(&config.output.dir);
    let path = archiver.archive(&outcome).context("Failed to write report")?;

    match &outcome {
        RunOutcome::Completed(_) => {
            println!("{} {}", "Report written:".green(), path.display());
            Ok(())
        }
        RunOutcome::Aborted(abort) => {
            println!(
                "{} after {} attempt(s) ({}): {}",
                "Task aborted".red(),
                abort.attempts,
                abort.cause,
                abort.error
            );
            println!("{} {}", "Error report written:".yellow(), path.display());
            eyre::bail!("Task aborted: {}", abort.error)
        }
    }
}

fn handle_config_command(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Resolve config before logging so log_level can seed the filter
    let default_args = RunArgs::default();
    let args = match &cli.command {
        Some(Commands::Run(args)) | Some(Commands::Config(args)) => args,
        None => &default_args,
    };
    let config = resolve_config(&cli, args)?;

    setup_logging(config.log_filter()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, config).await.context("Application failed")?;

    Ok(())
}
