//! Scripted agent for tests and dry runs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use super::{AgentError, AgentHistory, AgentService};

/// Replays a fixed sequence of results, one per `execute` call.
pub struct ScriptedAgent {
    script: Mutex<VecDeque<Result<AgentHistory, AgentError>>>,
    calls: AtomicU32,
}

impl ScriptedAgent {
    pub fn new(script: Vec<Result<AgentHistory, AgentError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        }
    }

    /// Number of times `execute` has been called
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentService for ScriptedAgent {
    async fn execute(&self) -> Result<AgentHistory, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .map_err(|e| AgentError::fatal(e.to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::fatal("script exhausted")))
    }
}
