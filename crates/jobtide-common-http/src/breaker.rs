// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Circuit breaker guarding calls to a remote dependency.
//!
//! ```text
//! Closed   -> Open:     failure_count reaches failure_threshold
//! Open     -> HalfOpen: recovery_timeout elapsed since the last failure
//! HalfOpen -> Closed:   the trial call succeeds (failure_count reset)
//! HalfOpen -> Open:     the trial call fails
//! ```
//!
//! State lives behind a mutex so one breaker can be shared by concurrent
//! callers. The lock is never held across an `.await`.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
	Closed,
	Open,
	HalfOpen,
}

/// Returned instead of invoking the operation while the breaker is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Circuit breaker is open")]
pub struct CircuitOpen;

#[derive(Debug, Clone, PartialEq)]
pub struct BreakerConfig {
	pub failure_threshold: u32,
	pub recovery_timeout: Duration,
}

impl Default for BreakerConfig {
	fn default() -> Self {
		Self {
			failure_threshold: 5,
			recovery_timeout: Duration::from_secs(60),
		}
	}
}

#[derive(Debug)]
struct BreakerState {
	state: CircuitState,
	failure_count: u32,
	last_failure: Option<Instant>,
	trial_in_flight: bool,
}

#[derive(Debug)]
pub struct CircuitBreaker {
	config: BreakerConfig,
	inner: Mutex<BreakerState>,
}

impl Default for CircuitBreaker {
	fn default() -> Self {
		Self::new(BreakerConfig::default())
	}
}

impl CircuitBreaker {
	pub fn new(config: BreakerConfig) -> Self {
		Self {
			config,
			inner: Mutex::new(BreakerState {
				state: CircuitState::Closed,
				failure_count: 0,
				last_failure: None,
				trial_in_flight: false,
			}),
		}
	}

	pub fn config(&self) -> &BreakerConfig {
		&self.config
	}

	pub fn state(&self) -> CircuitState {
		self.lock().state
	}

	pub fn failure_count(&self) -> u32 {
		self.lock().failure_count
	}

	/// Runs `f` if the breaker admits the call and records its outcome.
	///
	/// A rejected call never invokes `f` and is not counted as a failure. A
	/// call dropped mid-flight records no outcome and frees the Half-Open
	/// trial slot if it held it.
	pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, E>>,
		E: From<CircuitOpen>,
	{
		let holds_trial = self.admit()?;
		let slot = TrialSlot {
			breaker: self,
			held: holds_trial,
		};

		let outcome = f().await;
		std::mem::forget(slot);

		match outcome {
			Ok(value) => {
				self.record_success();
				Ok(value)
			}
			Err(err) => {
				self.record_failure();
				Err(err)
			}
		}
	}

	fn lock(&self) -> MutexGuard<'_, BreakerState> {
		// Transitions are plain assignments; a poisoned state is still consistent.
		self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Returns whether the admitted call is the Half-Open trial.
	fn admit(&self) -> Result<bool, CircuitOpen> {
		let mut inner = self.lock();

		if inner.state == CircuitState::Open {
			let cooled_down = inner
				.last_failure
				.map(|at| at.elapsed() > self.config.recovery_timeout)
				.unwrap_or(true);

			if !cooled_down {
				debug!(
					failure_count = inner.failure_count,
					"circuit open, rejecting call"
				);
				return Err(CircuitOpen);
			}

			info!("recovery timeout elapsed, circuit half-open");
			inner.state = CircuitState::HalfOpen;
			inner.trial_in_flight = false;
		}

		if inner.state == CircuitState::HalfOpen {
			if inner.trial_in_flight {
				debug!("trial call already in flight, rejecting call");
				return Err(CircuitOpen);
			}
			inner.trial_in_flight = true;
			return Ok(true);
		}

		Ok(false)
	}

	/// Frees the Half-Open trial slot of a call dropped before it finished.
	fn release_trial(&self) {
		let mut inner = self.lock();
		if inner.state == CircuitState::HalfOpen && inner.trial_in_flight {
			debug!("trial call abandoned, next call becomes the trial");
			inner.trial_in_flight = false;
		}
	}

	fn record_success(&self) {
		let mut inner = self.lock();

		if inner.state == CircuitState::HalfOpen {
			info!("trial call succeeded, circuit closed");
			inner.state = CircuitState::Closed;
			inner.failure_count = 0;
			inner.trial_in_flight = false;
		}
	}

	fn record_failure(&self) {
		let mut inner = self.lock();

		inner.failure_count = inner.failure_count.saturating_add(1);
		inner.last_failure = Some(Instant::now());

		let was_trial = inner.state == CircuitState::HalfOpen;
		inner.trial_in_flight = false;

		if was_trial || inner.failure_count >= self.config.failure_threshold {
			if inner.state != CircuitState::Open {
				warn!(
					failure_count = inner.failure_count,
					failure_threshold = self.config.failure_threshold,
					recovery_timeout_secs = self.config.recovery_timeout.as_secs(),
					"circuit opened"
				);
			}
			inner.state = CircuitState::Open;
		}
	}
}

/// Held across the guarded call. Only dropped, rather than forgotten, when
/// the call is cancelled mid-flight.
struct TrialSlot<'a> {
	breaker: &'a CircuitBreaker,
	held: bool,
}

impl Drop for TrialSlot<'_> {
	fn drop(&mut self) {
		if self.held {
			self.breaker.release_trial();
		}
	}
}
