//! Bounded fixed-delay retry for startup connectivity.
//!
//! The database is often co-scheduled with this process and takes longer
//! to come up; connection establishment therefore retries on a fixed
//! schedule before declaring failure. The schedule is an explicit state
//! machine (`Connecting -> Retrying -> Connected | FailedFatal`) so the
//! budget and exhaustion behavior are testable without a database: the
//! driver in `loadlab-server::db::pool` owns the actual connect calls and
//! the sleeps.

use std::time::Duration;

/// Retry budget for establishing the pool at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total connection attempts before giving up.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Total time spent waiting if every attempt fails.
    ///
    /// There is no wait after the final attempt, hence `max_attempts - 1`
    /// delays.
    pub fn total_wait(&self) -> Duration {
        self.delay * self.max_attempts.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    /// 10 attempts, 2 seconds apart: enough to ride out a database
    /// container finishing its own startup.
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(2),
        }
    }
}

/// Where connection establishment currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// An attempt is in flight (1-based).
    Connecting { attempt: u32 },
    /// The last attempt failed; waiting out the delay before the next one.
    Retrying { next_attempt: u32 },
    /// An attempt succeeded. Terminal.
    Connected,
    /// The budget is exhausted. Terminal; the caller must not serve.
    FailedFatal,
}

/// What the driver should do after reporting a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Sleep for the given duration, then call [`StartupRetry::begin_next`].
    Wait(Duration),
    /// Budget exhausted; the failure is fatal.
    GiveUp,
}

/// Startup retry state machine.
///
/// The driver loop reads [`StartupRetry::attempt`], performs one connect,
/// and reports the outcome via [`StartupRetry::succeed`] or
/// [`StartupRetry::fail`].
#[derive(Debug)]
pub struct StartupRetry {
    policy: RetryPolicy,
    state: RetryState,
}

impl StartupRetry {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: RetryState::Connecting { attempt: 1 },
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    /// 1-based number of the attempt in flight (or about to start).
    pub fn attempt(&self) -> u32 {
        match self.state {
            RetryState::Connecting { attempt } => attempt,
            RetryState::Retrying { next_attempt } => next_attempt,
            RetryState::Connected | RetryState::FailedFatal => self.policy.max_attempts,
        }
    }

    /// Record a successful attempt.
    pub fn succeed(&mut self) {
        self.state = RetryState::Connected;
    }

    /// Record a failed attempt and decide the next step.
    pub fn fail(&mut self) -> Step {
        let attempt = self.attempt();
        if attempt >= self.policy.max_attempts {
            self.state = RetryState::FailedFatal;
            Step::GiveUp
        } else {
            self.state = RetryState::Retrying {
                next_attempt: attempt + 1,
            };
            Step::Wait(self.policy.delay)
        }
    }

    /// Move from the post-failure wait into the next attempt.
    pub fn begin_next(&mut self) {
        if let RetryState::Retrying { next_attempt } = self.state {
            self.state = RetryState::Connecting {
                attempt: next_attempt,
            };
        }
    }
}
