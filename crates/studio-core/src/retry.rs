use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::StudioError;

/// Error classification for retry decisions.
#[derive(Debug, Clone)]
pub(crate) enum CallError {
    /// Transient — retried until the budget runs out (HTTP 429, transport failures).
    Retryable {
        status: Option<u16>,
        message: String,
    },
    /// Permanent — surfaced immediately (any other error status).
    Terminal {
        status: Option<u16>,
        message: String,
    },
}

/// Exponential backoff schedule for the completion client.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay inserted after the failure of attempt `attempt` (0-indexed).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Run `attempt_fn` until it succeeds, fails permanently, or exhausts the
/// retry budget.
///
/// The attempt counter is carried by an explicit loop, and the backoff wait
/// is performed through the injected `sleep` so the schedule can be tested
/// without a real clock. `attempt_fn` receives the 0-indexed attempt number.
pub(crate) async fn run_with_backoff<T, F, Fut, S, SFut>(
    policy: &RetryPolicy,
    mut sleep: S,
    mut attempt_fn: F,
) -> Result<T, StudioError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, CallError>>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut attempt: u32 = 0;
    loop {
        match attempt_fn(attempt).await {
            Ok(value) => return Ok(value),
            Err(CallError::Terminal { status, message }) => {
                warn!("Attempt {} failed permanently: {}", attempt + 1, message);
                return Err(StudioError::RemoteCallFailed { status, message });
            }
            Err(CallError::Retryable { status, message }) => {
                if attempt >= policy.max_retries {
                    warn!(
                        "Giving up after {} attempts, last error: {}",
                        attempt + 1,
                        message
                    );
                    return Err(StudioError::RemoteCallFailed { status, message });
                }
                let delay = policy.delay_after(attempt);
                debug!(
                    "Attempt {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    message,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
