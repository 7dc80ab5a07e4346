//! CLI module for agentrun - command-line interface and subcommands.

pub mod commands;

pub use commands::{Cli, Commands, RunArgs};
