//! agentrun - run one LLM-backed agent task and archive what it found
//!
//! The task runner retries rate-limited attempts with a fixed backoff, and the
//! archiver writes the terminal outcome to a timestamped Markdown report.

pub mod agent;
pub mod archive;
pub mod config;
pub mod domain;
pub mod error;
pub mod llm;
pub mod runner;

pub use error::{AgentrunError, Result};
