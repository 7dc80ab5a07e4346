//! Task runner implementation - bounded retries around a single agent task.
//!
//! The TaskRunner invokes the agent once per attempt. Rate-limited failures
//! are retried after a fixed backoff while attempts remain; any other failure
//! ends the run immediately.

use std::time::Duration;

use async_trait::async_trait;
use log::{error, info, warn};

use crate::agent::{AgentError, AgentService, ErrorKind};
use crate::domain::{Abort, AbortCause, AttemptOutcome, RunAttempt, RunOutcome};

/// Retry policy: attempt budget and fixed backoff between rate-limited attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum agent invocations, at least 1
    pub max_attempts: u32,
    /// Pause after a rate-limited attempt (no growth, no jitter)
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(30))
    }
}

/// Suspends the run between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// What the runner does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the backoff, then try again
    Retry(Duration),
    /// Stop and return an aborted outcome
    Abort(AbortCause),
}

/// A failed attempt together with the runner's decision about it.
#[derive(Debug, Clone, Copy)]
pub struct FailureReport<'a> {
    pub attempt: u32,
    pub max_attempts: u32,
    pub error: &'a AgentError,
    pub decision: RetryDecision,
}

/// Notified once per failed attempt, before any backoff sleep starts.
pub trait RunObserver: Send + Sync {
    fn attempt_failed(&self, report: &FailureReport<'_>);
}

/// Observer that ignores every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RunObserver for NoOpObserver {
    fn attempt_failed(&self, _report: &FailureReport<'_>) {}
}

/// TaskRunner drives one agent task to a terminal [`RunOutcome`].
///
/// At most one attempt is in flight at a time; only the most recent attempt
/// is kept between iterations.
pub struct TaskRunner<S: Sleeper = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
    observer: Box<dyn RunObserver>,
}

impl TaskRunner<TokioSleeper> {
    /// Create a runner that sleeps on the tokio timer.
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, TokioSleeper)
    }
}

impl<S: Sleeper> TaskRunner<S> {
    /// Create a runner with a custom sleeper.
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            policy,
            sleeper,
            observer: Box::new(NoOpObserver),
        }
    }

    /// Report failed attempts to `observer` as they happen.
    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run the agent until it succeeds, fails fatally, or the attempt budget is spent.
    pub async fn run<A>(&self, agent: &A) -> RunOutcome
    where
        A: AgentService + ?Sized,
    {
        let max_attempts = self.policy.max_attempts;
        let mut index = 1;

        loop {
            let outcome = match agent.execute().await {
                Ok(history) => AttemptOutcome::Success(history),
                Err(err) => AttemptOutcome::Failure(err),
            };
            let attempt = RunAttempt::new(index, outcome);

            let error = match attempt.outcome {
                AttemptOutcome::Success(history) => {
                    info!("Attempt {}/{} succeeded at {}", attempt.index, max_attempts, attempt.at);
                    return RunOutcome::Completed(history);
                }
                AttemptOutcome::Failure(error) => error,
            };

            let decision = match error.kind {
                ErrorKind::RateLimited if attempt.index < max_attempts => RetryDecision::Retry(self.policy.backoff),
                ErrorKind::RateLimited => RetryDecision::Abort(AbortCause::RetriesExhausted),
                ErrorKind::Fatal => RetryDecision::Abort(AbortCause::Fatal),
            };

            warn!(
                "Attempt {}/{} failed ({}): {}",
                attempt.index, max_attempts, error.kind, error
            );
            self.observer.attempt_failed(&FailureReport {
                attempt: attempt.index,
                max_attempts,
                error: &error,
                decision,
            });

            match decision {
                RetryDecision::Retry(backoff) => {
                    warn!(
                        "Rate limited; retrying in {}s ({} attempt(s) left)",
                        backoff.as_secs(),
                        max_attempts - attempt.index
                    );
                    self.sleeper.sleep(backoff).await;
                    index += 1;
                }
                RetryDecision::Abort(cause) => {
                    match cause {
                        AbortCause::RetriesExhausted => {
                            error!("Rate limited on final attempt {}; giving up", attempt.index)
                        }
                        AbortCause::Fatal => error!("Non-retryable error on attempt {}; aborting", attempt.index),
                    }
                    return RunOutcome::Aborted(Abort {
                        error,
                        attempts: attempt.index,
                        cause,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentHistory, ScriptedAgent};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// Records requested sleeps without waiting.
    #[derive(Clone, Default)]
    struct RecordingSleeper {
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Failed(u32, RetryDecision),
        Slept(Duration),
    }

    /// Shared event log written by both the observer and the sleeper.
    #[derive(Clone, Default)]
    struct EventLog {
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl EventLog {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    impl RunObserver for EventLog {
        fn attempt_failed(&self, report: &FailureReport<'_>) {
            self.events.lock().unwrap().push(Event::Failed(report.attempt, report.decision));
        }
    }

    #[async_trait]
    impl Sleeper for EventLog {
        async fn sleep(&self, duration: Duration) {
            self.events.lock().unwrap().push(Event::Slept(duration));
        }
    }

    fn rate_limited() -> Result<AgentHistory, AgentError> {
        Err(AgentError::rate_limited("Error code: 429 - quota exceeded"))
    }

    fn done(text: &str) -> Result<AgentHistory, AgentError> {
        Ok(AgentHistory::new(vec![], Some(text.to_string())))
    }

    #[test]
    fn test_retry_policy_clamps_attempts() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(RetryPolicy::default(), RetryPolicy::new(3, Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let sleeper = RecordingSleeper::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::new(3, Duration::from_secs(30)), sleeper.clone());
        let agent = ScriptedAgent::new(vec![done("ok"), done("never")]);

        let outcome = runner.run(&agent).await;

        assert_eq!(outcome, RunOutcome::Completed(AgentHistory::new(vec![], Some("ok".into()))));
        assert_eq!(agent.calls(), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_retries_rate_limit_then_succeeds() {
        let sleeper = RecordingSleeper::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::new(3, Duration::from_secs(30)), sleeper.clone());
        let agent = ScriptedAgent::new(vec![rate_limited(), rate_limited(), done("third")]);

        let outcome = runner.run(&agent).await;

        assert!(outcome.is_completed());
        assert_eq!(agent.calls(), 3);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(30), Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn test_fatal_error_aborts_immediately() {
        let sleeper = RecordingSleeper::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::new(3, Duration::from_secs(30)), sleeper.clone());
        let agent = ScriptedAgent::new(vec![Err(AgentError::fatal("browser crashed")), done("never")]);

        let outcome = runner.run(&agent).await;

        let abort = outcome.abort().unwrap();
        assert_eq!(abort.cause, AbortCause::Fatal);
        assert_eq!(abort.attempts, 1);
        assert_eq!(abort.error.message, "browser crashed");
        assert_eq!(agent.calls(), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_fatal_after_rate_limit_keeps_latest_error() {
        let sleeper = RecordingSleeper::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::new(5, Duration::from_secs(2)), sleeper.clone());
        let agent = ScriptedAgent::new(vec![rate_limited(), Err(AgentError::fatal("invalid api key"))]);

        let outcome = runner.run(&agent).await;

        let abort = outcome.abort().unwrap();
        assert_eq!(abort.cause, AbortCause::Fatal);
        assert_eq!(abort.attempts, 2);
        assert_eq!(abort.error.message, "invalid api key");
        assert_eq!(agent.calls(), 2);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_rate_limited_every_attempt_exhausts_retries() {
        let sleeper = RecordingSleeper::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::new(3, Duration::from_secs(30)), sleeper.clone());
        let agent = ScriptedAgent::new(vec![rate_limited(), rate_limited(), rate_limited(), done("never")]);

        let outcome = runner.run(&agent).await;

        let abort = outcome.abort().unwrap();
        assert_eq!(abort.cause, AbortCause::RetriesExhausted);
        assert_eq!(abort.attempts, 3);
        assert!(abort.error.is_rate_limited());
        assert_eq!(agent.calls(), 3);
        // No sleep after the last attempt
        assert_eq!(sleeper.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn test_single_attempt_never_sleeps() {
        let sleeper = RecordingSleeper::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::new(1, Duration::from_secs(30)), sleeper.clone());
        let agent = ScriptedAgent::new(vec![rate_limited()]);

        let outcome = runner.run(&agent).await;

        assert_eq!(outcome.abort().map(|a| a.cause), Some(AbortCause::RetriesExhausted));
        assert_eq!(agent.calls(), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_calls_equal_rate_limits_plus_one() {
        for rate_limits in 0..4u32 {
            let sleeper = RecordingSleeper::default();
            let runner = TaskRunner::with_sleeper(RetryPolicy::new(5, Duration::from_secs(1)), sleeper.clone());
            let mut script: Vec<_> = (0..rate_limits).map(|_| rate_limited()).collect();
            script.push(done("ok"));
            let agent = ScriptedAgent::new(script);

            assert!(runner.run(&agent).await.is_completed());
            assert_eq!(agent.calls(), rate_limits + 1);
            assert_eq!(sleeper.sleeps().len() as u32, rate_limits);
        }
    }

    #[tokio::test]
    async fn test_tokio_sleeper_waits() {
        let runner = TaskRunner::new(RetryPolicy::new(2, Duration::from_millis(20)));
        let agent = ScriptedAgent::new(vec![rate_limited(), done("ok")]);

        let start = Instant::now();
        let outcome = runner.run(&agent).await;

        assert!(outcome.is_completed());
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(runner.policy().max_attempts, 2);
    }

    #[tokio::test]
    async fn test_observer_notified_before_each_backoff() {
        let log = EventLog::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::new(3, Duration::from_secs(30)), log.clone())
            .with_observer(log.clone());
        let agent = ScriptedAgent::new(vec![rate_limited(), rate_limited(), done("ok")]);

        assert!(runner.run(&agent).await.is_completed());

        let backoff = Duration::from_secs(30);
        assert_eq!(
            log.events(),
            vec![
                Event::Failed(1, RetryDecision::Retry(backoff)),
                Event::Slept(backoff),
                Event::Failed(2, RetryDecision::Retry(backoff)),
                Event::Slept(backoff),
            ]
        );
    }

    #[tokio::test]
    async fn test_observer_sees_abort_decisions() {
        let log = EventLog::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::new(2, Duration::from_secs(5)), log.clone())
            .with_observer(log.clone());
        let agent = ScriptedAgent::new(vec![rate_limited(), rate_limited()]);

        runner.run(&agent).await;

        assert_eq!(
            log.events(),
            vec![
                Event::Failed(1, RetryDecision::Retry(Duration::from_secs(5))),
                Event::Slept(Duration::from_secs(5)),
                Event::Failed(2, RetryDecision::Abort(AbortCause::RetriesExhausted)),
            ]
        );

        let log = EventLog::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::default(), log.clone()).with_observer(log.clone());
        let agent = ScriptedAgent::new(vec![Err(AgentError::fatal("browser crashed"))]);

        runner.run(&agent).await;

        assert_eq!(log.events(), vec![Event::Failed(1, RetryDecision::Abort(AbortCause::Fatal))]);
    }

    #[tokio::test]
    async fn test_observer_silent_on_success() {
        let log = EventLog::default();
        let runner = TaskRunner::with_sleeper(RetryPolicy::default(), log.clone()).with_observer(log.clone());
        let agent = ScriptedAgent::new(vec![done("ok")]);

        assert!(runner.run(&agent).await.is_completed());
        assert!(log.events().is_empty());
    }
}
