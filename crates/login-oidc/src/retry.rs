//! Retry with exponential backoff for calls to the identity provider.

use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::Result;

/// How often, and how patiently, a provider call is repeated.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  /// Attempts after the first one.
  pub retries:         u32,
  pub initial_backoff: Duration,
  pub max_backoff:     Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      retries:         2,
      initial_backoff: Duration::from_millis(100),
      max_backoff:     Duration::from_secs(5),
    }
  }
}

impl RetryPolicy {
  pub fn with_retries(retries: u32) -> Self {
    Self {
      retries,
      ..Default::default()
    }
  }

  fn backoff(&self, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    self
      .initial_backoff
      .saturating_mul(factor)
      .min(self.max_backoff)
  }

  /// Run `f` until it succeeds, fails permanently, or the retries run out.
  pub async fn run<F, Fut, T>(&self, operation: &str, f: F) -> Result<T>
  where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let mut attempt = 0;
    loop {
      match f().await {
        Ok(value) => {
          if attempt > 0 {
            info!(operation, attempt = attempt + 1, "provider call succeeded after retry");
          }
          return Ok(value);
        }
        Err(e) if e.is_transient() && attempt < self.retries => {
          let delay = self.backoff(attempt);
          warn!(
            operation,
            attempt = attempt + 1,
            error = %e,
            delay_ms = delay.as_millis() as u64,
            "provider call failed, retrying"
          );
          sleep(delay).await;
          attempt += 1;
        }
        Err(e) => return Err(e),
      }
    }
  }
}
