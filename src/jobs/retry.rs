use std::fmt::Display;
use std::future::Future;
use tokio::time::sleep;
use tracing::warn;

use crate::config::RetryPolicy;
use crate::jobs::calculate_backoff_delay;

/// Run `op` until it succeeds, fails with an error `should_retry` rejects,
/// or `policy.max_attempts` attempts have been made.
pub async fn retry<T, E, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    mut op: F,
    should_retry: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && should_retry(&e) => {
                let delay = calculate_backoff_delay(attempt - 1, policy.base_delay);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {}ms",
                    what,
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
