// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retry and circuit breaker tuning.

use std::time::Duration;

use jobtide_common_http::{BreakerConfig, RetryConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResilienceConfigLayer {
	pub max_attempts: Option<u32>,
	pub base_delay_ms: Option<u64>,
	pub max_delay_ms: Option<u64>,
	pub backoff_factor: Option<f64>,
	pub jitter: Option<bool>,
	pub failure_threshold: Option<u32>,
	pub recovery_timeout_secs: Option<u64>,
}

impl ResilienceConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.max_attempts.is_some() {
			self.max_attempts = other.max_attempts;
		}
		if other.base_delay_ms.is_some() {
			self.base_delay_ms = other.base_delay_ms;
		}
		if other.max_delay_ms.is_some() {
			self.max_delay_ms = other.max_delay_ms;
		}
		if other.backoff_factor.is_some() {
			self.backoff_factor = other.backoff_factor;
		}
		if other.jitter.is_some() {
			self.jitter = other.jitter;
		}
		if other.failure_threshold.is_some() {
			self.failure_threshold = other.failure_threshold;
		}
		if other.recovery_timeout_secs.is_some() {
			self.recovery_timeout_secs = other.recovery_timeout_secs;
		}
	}

	pub fn finalize(self) -> ResilienceConfig {
		let retry_defaults = RetryConfig::default();
		let breaker_defaults = BreakerConfig::default();

		ResilienceConfig {
			retry: RetryConfig {
				max_attempts: self.max_attempts.unwrap_or(retry_defaults.max_attempts),
				base_delay: self
					.base_delay_ms
					.map(Duration::from_millis)
					.unwrap_or(retry_defaults.base_delay),
				max_delay: self
					.max_delay_ms
					.map(Duration::from_millis)
					.unwrap_or(retry_defaults.max_delay),
				backoff_factor: self.backoff_factor.unwrap_or(retry_defaults.backoff_factor),
				jitter: self.jitter.unwrap_or(retry_defaults.jitter),
			},
			breaker: BreakerConfig {
				failure_threshold: self
					.failure_threshold
					.unwrap_or(breaker_defaults.failure_threshold),
				recovery_timeout: self
					.recovery_timeout_secs
					.map(Duration::from_secs)
					.unwrap_or(breaker_defaults.recovery_timeout),
			},
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct ResilienceConfig {
	pub retry: RetryConfig,
	pub breaker: BreakerConfig,
}
