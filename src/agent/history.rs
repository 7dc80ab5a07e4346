//! Structured result of one agent execution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single action the agent executed, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub name: String,
    #[serde(default)]
    pub params: Value,
}

impl ActionRecord {
    pub fn new(name: impl Into<String>, params: Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// `{name: params}` form used in the action trace
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.name.clone(), self.params.clone());
        Value::Object(map)
    }
}

/// One step of agent execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStep {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AgentStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_action(mut self, action: ActionRecord) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Everything an agent reports back after a successful execution.
///
/// Only read through its projections once it leaves the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentHistory {
    #[serde(default)]
    pub steps: Vec<AgentStep>,
    #[serde(default)]
    pub final_result: Option<String>,
}

impl AgentHistory {
    pub fn new(steps: Vec<AgentStep>, final_result: Option<String>) -> Self {
        Self { steps, final_result }
    }

    /// Visited URLs, in step order
    pub fn urls(&self) -> Vec<String> {
        self.steps.iter().filter_map(|s| s.url.clone()).collect()
    }

    /// Names of every executed action, in order
    pub fn action_names(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|s| s.actions.iter().map(|a| a.name.clone()))
            .collect()
    }

    /// Errors recorded by individual steps
    pub fn errors(&self) -> Vec<String> {
        self.steps.iter().filter_map(|s| s.error.clone()).collect()
    }

    /// Full action trace as `{name: params}` objects
    pub fn model_actions(&self) -> Vec<Value> {
        self.steps
            .iter()
            .flat_map(|s| s.actions.iter().map(ActionRecord::to_value))
            .collect()
    }

    /// Report body: the final result with literal `\n` sequences turned into line breaks.
    ///
    /// Model output sometimes arrives double-escaped.
    pub fn primary_body(&self) -> String {
        self.final_result
            .as_deref()
            .unwrap_or_default()
            .replace("\\n", "\n")
    }
}
