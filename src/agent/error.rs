//! Typed errors raised at the agent boundary.

use std::fmt;

/// Coarse classification of an agent failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transient quota exhaustion; worth retrying after a backoff
    RateLimited,
    /// Anything else; retrying will not help
    Fatal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::RateLimited => write!(f, "rate-limited"),
            ErrorKind::Fatal => write!(f, "fatal"),
        }
    }
}

/// An error returned by an [`AgentService`](super::AgentService) execution.
///
/// The kind is decided once, where the error leaves the agent, so callers
/// match on [`ErrorKind`] instead of inspecting text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AgentError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AgentError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, message)
    }

    /// Classify an untyped error message: it is rate-limited iff it contains `marker`.
    pub fn classify(message: impl Into<String>, marker: &str) -> Self {
        let message = message.into();
        let kind = if !marker.is_empty() && message.contains(marker) {
            ErrorKind::RateLimited
        } else {
            ErrorKind::Fatal
        };
        Self { kind, message }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.kind == ErrorKind::RateLimited
    }
}
