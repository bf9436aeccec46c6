// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry logic with exponential backoff for remote calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::classify::ClassifiedError;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
	/// Total attempts including the first one. Zero is treated as one.
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	pub backoff_factor: f64,
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_secs(2),
			max_delay: Duration::from_secs(60),
			backoff_factor: 2.0,
			jitter: false,
		}
	}
}

/// Delay before retry number `retry_index + 1`: `base * factor^retry_index`.
fn calculate_delay(cfg: &RetryConfig, retry_index: u32) -> Duration {
	let exponential_delay =
		cfg.base_delay.as_secs_f64() * cfg.backoff_factor.powi(retry_index as i32);
	let capped_delay = exponential_delay.min(cfg.max_delay.as_secs_f64());

	let final_delay = if cfg.jitter {
		let jitter_factor = 0.5 + fastrand::f64();
		capped_delay * jitter_factor
	} else {
		capped_delay
	};

	Duration::from_secs_f64(final_delay.max(0.0))
}

/// Runs `f` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` attempts have been made. The last error is returned as-is.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: ClassifiedError + Display,
{
	let max_attempts = cfg.max_attempts.max(1);
	let mut attempt = 0;

	loop {
		match f().await {
			Ok(result) => return Ok(result),
			Err(err) => {
				attempt += 1;

				if !err.is_retryable() {
					warn!(
						error = %err,
						kind = %err.kind(),
						attempt = attempt,
						"non-retryable error encountered"
					);
					return Err(err);
				}

				if attempt >= max_attempts {
					warn!(
						error = %err,
						attempt = attempt,
						max_attempts = max_attempts,
						"max retry attempts exhausted"
					);
					return Err(err);
				}

				let delay = calculate_delay(cfg, attempt - 1);
				warn!(
					error = %err,
					attempt = attempt,
					max_attempts = max_attempts,
					delay_ms = delay.as_millis() as u64,
					"retrying after error"
				);

				tokio::time::sleep(delay).await;
			}
		}
	}
}
