//! Domain types for agentrun
//!
//! - RunOutcome: terminal result of a run (Completed, Aborted)
//! - RunAttempt: record of one agent invocation

pub mod outcome;

pub use outcome::{Abort, AbortCause, AttemptOutcome, RunAttempt, RunOutcome};
