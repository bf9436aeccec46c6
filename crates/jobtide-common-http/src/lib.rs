// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for jobtide.
//!
//! This crate provides:
//! - A reqwest client builder preset with the caller's User-Agent
//! - Retry logic with exponential backoff for transient failures
//! - A circuit breaker that fails fast once a dependency keeps failing
//! - [`FailureKind`], the closed set of failure classes callers branch on
//!
//! The breaker guards individual attempts, so it is meant to be used inside
//! the closure handed to [`retry`]:
//!
//! ```ignore
//! let page = retry(&cfg, || breaker.call(|| fetch(page_no))).await?;
//! ```

mod breaker;
mod classify;
mod client;
mod retry;

pub use breaker::{BreakerConfig, CircuitBreaker, CircuitOpen, CircuitState};
pub use classify::{classify_status, ClassifiedError, FailureKind};
pub use client::{builder_with_user_agent, user_agent};
pub use retry::{retry, RetryConfig};
