// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Bounded retry combinator for remote queries.
///
/// A failed attempt is repeated in full; no partial results survive between
/// attempts. The default budget is two attempts without delay, which is the
/// "retry once, then fail the whole run" policy of the report generator.
use std::{fmt::Display, time::Duration};

use tokio::time::sleep;
use tracing::{debug, error};

/// Configuration for retry behavior.
#[derive(Debug, Clone,)]
pub struct RetryConfig
{
    /// Total number of attempts including the first one (default: 2).
    pub max_attempts:     u32,
    /// Delay before the second attempt in milliseconds (default: 0).
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after every failed attempt.
    pub backoff_factor:   f64,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 2, initial_delay_ms: 0, backoff_factor: 1.0,
        }
    }
}

/// Executes an async operation until it succeeds or the attempt budget is
/// exhausted.
///
/// # Arguments
///
/// * `config` - Retry configuration (attempts, delays)
/// * `operation_name` - Name of the operation for logging
/// * `f` - Async function producing one complete attempt
///
/// # Errors
///
/// Returns the last error encountered if all attempts fail.
///
/// # Example
///
/// ```no_run
/// use community::{Error, RetryConfig, retry_with_backoff};
///
/// # async fn example() -> Result<(), Error> {
/// let config = RetryConfig::default();
/// let result = retry_with_backoff(&config, "fetch data", || async {
///     Ok::<_, Error,>(42,)
/// },)
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T, E,>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F,
) -> Result<T, E,>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E,>,>,
    E: Display,
{
    let mut attempt = 1;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match f().await {
            Ok(result,) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result,);
            }
            Err(err,) => {
                if attempt >= config.max_attempts.max(1,) {
                    error!(
                        "{} failed after {} attempts: {}",
                        operation_name, attempt, err
                    );
                    return Err(err,);
                }

                error!("{} failed (will retry): {}", operation_name, err);

                if delay_ms > 0 {
                    sleep(Duration::from_millis(delay_ms,),).await;
                    delay_ms = (delay_ms as f64 * config.backoff_factor) as u64;
                }
                attempt += 1;
            }
        }
    }
}
