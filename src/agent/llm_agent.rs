//! Agent adapter that runs the task as a single LLM completion.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::{ActionRecord, AgentError, AgentHistory, AgentService, AgentStep};
use crate::llm::{CompletionRequest, LlmClient, LlmError};

const SYSTEM_PROMPT: &str = "You are an autonomous research agent. Complete the user's task \
and reply with the final answer only, formatted as Markdown.";

/// Runs a task through an [`LlmClient`] and reports it as an [`AgentHistory`].
pub struct LlmAgent<L: LlmClient> {
    llm: Arc<L>,
    task: String,
    max_tokens: Option<u32>,
    rate_limit_marker: String,
}

impl<L: LlmClient> LlmAgent<L> {
    pub fn new(llm: Arc<L>, task: impl Into<String>, rate_limit_marker: impl Into<String>) -> Self {
        Self {
            llm,
            task: task.into(),
            max_tokens: None,
            rate_limit_marker: rate_limit_marker.into(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    fn to_agent_error(&self, err: LlmError) -> AgentError {
        if err.is_rate_limit() {
            AgentError::rate_limited(err.to_string())
        } else {
            AgentError::classify(err.to_string(), &self.rate_limit_marker)
        }
    }
}

#[async_trait]
impl<L: LlmClient> AgentService for LlmAgent<L> {
    async fn execute(&self) -> Result<AgentHistory, AgentError> {
        let mut request = CompletionRequest::new(SYSTEM_PROMPT).with_user_message(&self.task);
        request.max_tokens = self.max_tokens;

        let response = self
            .llm
            .complete(request)
            .await
            .map_err(|e| self.to_agent_error(e))?;

        log::debug!(
            "{} answered with {} chars ({} tokens)",
            self.llm.model(),
            response.content.len(),
            response.usage.total()
        );

        let complete = response.stop_reason.is_complete();
        let mut step = AgentStep::new().with_action(ActionRecord::new(
            "done",
            json!({ "text": response.content, "success": complete }),
        ));
        if !complete {
            step = step.with_error(format!("Generation stopped early: {:?}", response.stop_reason));
        }

        Ok(AgentHistory::new(vec![step], Some(response.content)))
    }
}
