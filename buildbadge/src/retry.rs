// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Retry utilities with exponential backoff for status lookups.
//!
//! Only transient failures (see [`Error::is_transient`]) are retried. Any
//! other error is returned on the spot.

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{error::Error, status::BuildOutcome, store::StatusSource};

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included (default: 3).
    pub max_attempts:     u32,
    /// Delay before the second attempt in milliseconds (default: 100).
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after each failure (default: 2.0).
    pub backoff_factor:   f64
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts:     3,
            initial_delay_ms: 100,
            backoff_factor:   2.0
        }
    }
}

/// Executes an async operation, retrying transient failures with
/// exponential backoff.
///
/// # Errors
///
/// Returns the first non-transient error, or the last transient error once
/// `config.max_attempts` attempts have failed.
///
/// # Example
///
/// ```no_run
/// use buildbadge::{Error, RetryConfig, retry_with_backoff};
///
/// # async fn example() -> Result<(), Error> {
/// let config = RetryConfig::default();
/// let value = retry_with_backoff(&config, "fetch status", || async { Ok::<_, Error>(42) }).await?;
/// assert_eq!(value, 42);
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>
{
    let mut attempt = 1;
    let mut delay_ms = config.initial_delay_ms;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(error) if !error.is_transient() => return Err(error),
            Err(error) => {
                if attempt >= config.max_attempts {
                    warn!(
                        "{} failed after {} attempts: {}",
                        operation_name, attempt, error
                    );
                    return Err(error);
                }

                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {}ms...",
                    operation_name, attempt, config.max_attempts, error, delay_ms
                );

                sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = (delay_ms as f64 * config.backoff_factor) as u64;
                attempt += 1;
            }
        }
    }
}

/// Status source decorator that retries transient lookup failures.
#[derive(Debug, Clone)]
pub struct RetryingSource<S> {
    inner:  S,
    config: RetryConfig
}

impl<S> RetryingSource<S> {
    /// Wraps `inner` with the given retry policy.
    pub fn new(inner: S, config: RetryConfig) -> Self {
        Self {
            inner,
            config
        }
    }

    /// Returns the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: StatusSource> StatusSource for RetryingSource<S> {
    fn find_status(
        &self,
        identifier: &str
    ) -> impl Future<Output = Result<BuildOutcome, Error>> + Send {
        retry_with_backoff(&self.config, "build status lookup", move || {
            self.inner.find_status(identifier)
        })
    }
}
