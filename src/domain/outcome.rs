//! Run execution outcome types.
//!
//! This module defines the terminal result of a task run and the record kept
//! for a single attempt.

use chrono::{DateTime, Local};

use crate::agent::{AgentError, AgentHistory};

/// Why a run stopped without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortCause {
    /// A non-retryable error ended the run
    Fatal,
    /// Every permitted attempt was rate-limited
    RetriesExhausted,
}

impl std::fmt::Display for AbortCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortCause::Fatal => write!(f, "fatal error"),
            AbortCause::RetriesExhausted => write!(f, "retries exhausted"),
        }
    }
}

/// Details of an aborted run.
#[derive(Debug, Clone, PartialEq)]
pub struct Abort {
    /// The most recent error
    pub error: AgentError,
    /// How many attempts were made
    pub attempts: u32,
    pub cause: AbortCause,
}

/// Outcome of a task run. Terminal: no attempts follow it.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The agent returned a history
    Completed(AgentHistory),
    /// The run gave up
    Aborted(Abort),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn history(&self) -> Option<&AgentHistory> {
        match self {
            RunOutcome::Completed(history) => Some(history),
            RunOutcome::Aborted(_) => None,
        }
    }

    pub fn abort(&self) -> Option<&Abort> {
        match self {
            RunOutcome::Completed(_) => None,
            RunOutcome::Aborted(abort) => Some(abort),
        }
    }
}

/// Result of a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(AgentHistory),
    Failure(AgentError),
}

/// One invocation of the agent. Only the most recent attempt is kept.
#[derive(Debug, Clone)]
pub struct RunAttempt {
    /// 1-based attempt number
    pub index: u32,
    pub outcome: AttemptOutcome,
    pub at: DateTime<Local>,
}

impl RunAttempt {
    pub fn new(index: u32, outcome: AttemptOutcome) -> Self {
        Self {
            index,
            outcome,
            at: Local::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_outcome_accessors() {
        let completed = RunOutcome::Completed(AgentHistory::default());
        assert!(completed.is_completed());
        assert!(completed.history().is_some());
        assert!(completed.abort().is_none());

        let aborted = RunOutcome::Aborted(Abort {
            error: AgentError::fatal("boom"),
            attempts: 1,
            cause: AbortCause::Fatal,
        });
        assert!(!aborted.is_completed());
        assert!(aborted.history().is_none());
        assert_eq!(aborted.abort().map(|a| a.attempts), Some(1));
    }

    #[test]
    fn test_abort_cause_display() {
        assert_eq!(AbortCause::Fatal.to_string(), "fatal error");
        assert_eq!(AbortCause::RetriesExhausted.to_string(), "retries exhausted");
    }

    #[test]
    fn test_run_attempt_records_index() {
        let attempt = RunAttempt::new(2, AttemptOutcome::Failure(AgentError::rate_limited("429")));
        assert_eq!(attempt.index, 2);
        assert!(matches!(attempt.outcome, AttemptOutcome::Failure(_)));
        assert!(attempt.at <= Local::now());
    }
}
