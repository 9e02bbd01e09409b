//! Bounded retry with a fixed pause after every attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Run `operation` up to `max_attempts` times (at least once).
///
/// The closure receives the 1-based attempt number. `delay` is slept after
/// each attempt, successful or not, so consecutive renders stay spaced out.
/// Returns the first success or the last error.
pub async fn with_retries<T, E, F, Fut>(
    label: &str,
    max_attempts: u32,
    delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let result = operation(attempt).await;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match result {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{}: succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    "{}: attempt {}/{} failed: {}",
                    label, attempt, max_attempts, e
                );
                attempt += 1;
            }
            Err(e) => {
                warn!("{}: giving up after {} attempts: {}", label, attempt, e);
                return Err(e);
            }
        }
    }
}
