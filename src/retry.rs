//! Bounded retry with a fixed delay between attempts.

use log::{debug, info, warn};
use std::fmt::Display;
use std::time::Duration;

/// How often and how far apart an operation is attempted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Zero behaves like one.
    pub max_attempts: usize,
    /// Pause after every failed attempt.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Longest time [`with_retry`] can block before giving up.
    pub fn total_wait(&self) -> Duration {
        self.delay * self.max_attempts.max(1) as u32
    }
}

/// Why [`with_retry`] stopped without a result.
#[derive(Debug, PartialEq)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; `last` is the final one.
    Exhausted { attempts: usize, last: E },
    /// An attempt failed with an error that must not be retried.
    Aborted(E),
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's attempts are used up.
///
/// The operation receives the 1-based attempt number. `sleep` is called with
/// `policy.delay` after every retryable failure, the last one included, so an
/// exhausted run has waited exactly [`RetryPolicy::total_wait`].
pub fn with_retry<T, E, Op, Retryable, Sleep>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: Op,
    is_retryable: Retryable,
    mut sleep: Sleep,
) -> Result<T, RetryError<E>>
where
    E: Display,
    Op: FnMut(usize) -> Result<T, E>,
    Retryable: Fn(&E) -> bool,
    Sleep: FnMut(Duration),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation(attempt) {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{}: succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if !is_retryable(&e) => {
                debug!("{}: non-retryable error: {}", operation_name, e);
                return Err(RetryError::Aborted(e));
            }
            Err(e) => {
                info!(
                    "{}: attempt {}/{} failed ({}), waiting {:?}",
                    operation_name, attempt, max_attempts, e, policy.delay
                );
                sleep(policy.delay);
                if attempt >= max_attempts {
                    warn!("{}: giving up after {} attempts", operation_name, attempt);
                    return Err(RetryError::Exhausted { attempts: attempt, last: e });
                }
            }
        }
    }
}
