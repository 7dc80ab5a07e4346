//! Agent boundary - the external service that performs the task.
//!
//! This module provides:
//! - AgentService trait, invoked once per attempt
//! - AgentHistory and its read-only projections
//! - AgentError with a closed ErrorKind
//! - LlmAgent, an adapter backed by an LlmClient
//! - ScriptedAgent, a replaying stand-in for tests

mod error;
mod history;
mod llm_agent;
mod scripted;

use async_trait::async_trait;

pub use error::{AgentError, ErrorKind};
pub use history::{ActionRecord, AgentHistory, AgentStep};
pub use llm_agent::LlmAgent;
pub use scripted::ScriptedAgent;

/// Performs the automated task and returns its structured history.
#[async_trait]
pub trait AgentService: Send + Sync {
    async fn execute(&self) -> Result<AgentHistory, AgentError>;
}
