use std::{future::Future, time::Duration};
use tokio::time::sleep;
use tracing::{error, warn};

use crate::config::RetryPolicy;

/// Run `op` until it succeeds or `policy.max_retries` extra attempts are spent,
/// doubling the delay after every failure.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempts = 0;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if attempts < policy.max_retries => {
                attempts += 1;
                let backoff = backoff_delay(policy.initial_backoff, attempts);
                warn!(%what, attempt = attempts, delay_ms = backoff.as_millis() as u64, error = %e, "Retrying");
                sleep(backoff).await;
            }
            Err(e) => {
                error!(%what, attempts = attempts + 1, error = %e, "Exhausted retries");
                return Err(e);
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based); saturates instead of overflowing.
fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    initial.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}
