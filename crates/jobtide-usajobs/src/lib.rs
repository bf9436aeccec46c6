// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! USAJOBS search API client for jobtide.
//!
//! This crate provides a typed client for the USAJOBS `/api/search` endpoint
//! that retries transient failures, trips a circuit breaker when the API
//! keeps failing, and throttles successive requests. [`extract_postings`]
//! turns a fetched page into validated [`jobtide_common_core::JobPosting`]s.

pub mod client;
pub mod error;
pub mod extract;
pub mod types;

pub use client::{UsaJobsClient, DEFAULT_BASE_URL};
pub use error::UsaJobsError;
pub use extract::extract_postings;
pub use jobtide_common_http::{BreakerConfig, RetryConfig};
pub use types::{SearchPage, SearchQuery, SearchResult, MAX_RESULTS_PER_PAGE};
