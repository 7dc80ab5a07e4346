//! Task runner module - bounded retry loop around the agent.
//!
//! This module provides:
//! - TaskRunner for executing one task to a terminal RunOutcome
//! - RetryPolicy for the attempt budget and fixed backoff
//! - Sleeper for the suspension between rate-limited attempts
//! - RunObserver for live reporting of failed attempts

mod task_runner;

pub use task_runner::{
    FailureReport, NoOpObserver, RetryDecision, RetryPolicy, RunObserver, Sleeper, TaskRunner, TokioSleeper,
};
