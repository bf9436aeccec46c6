// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! USAJOBS search API client implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jobtide_common_http::{retry, BreakerConfig, CircuitBreaker, RetryConfig};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, instrument, trace};

use crate::error::UsaJobsError;
use crate::types::{SearchPage, SearchQuery};

pub const DEFAULT_BASE_URL: &str = "https://data.usajobs.gov/api/search";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1500);

/// Client for the USAJOBS search API.
///
/// Each [`search_page`](Self::search_page) call runs through the retry loop,
/// with every attempt guarded by the client's circuit breaker. After a
/// successful fetch the call sleeps for the configured request delay, which
/// throttles whatever request the caller makes next.
#[derive(Debug)]
pub struct UsaJobsClient {
	http_client: Client,
	api_key: SecretString,
	base_url: String,
	retry_config: RetryConfig,
	breaker: Arc<CircuitBreaker>,
	request_delay: Duration,
	timeout: Duration,
	request_count: AtomicU64,
}

impl UsaJobsClient {
	/// Creates a client. USAJOBS asks for the registered contact email as the
	/// User-Agent.
	pub fn new(api_key: SecretString, user_agent: impl Into<String>) -> Result<Self, UsaJobsError> {
		let http_client = jobtide_common_http::builder_with_user_agent(user_agent).build()?;

		Ok(Self {
			http_client,
			api_key,
			base_url: DEFAULT_BASE_URL.to_string(),
			retry_config: RetryConfig::default(),
			breaker: Arc::new(CircuitBreaker::default()),
			request_delay: DEFAULT_REQUEST_DELAY,
			timeout: DEFAULT_REQUEST_TIMEOUT,
			request_count: AtomicU64::new(0),
		})
	}

	/// Sets a custom base URL for the API (useful for testing).
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	/// Replaces the breaker with a fresh one using `config`.
	pub fn with_breaker_config(mut self, config: BreakerConfig) -> Self {
		self.breaker = Arc::new(CircuitBreaker::new(config));
		self
	}

	/// Shares an existing breaker, e.g. between clients hitting the same host.
	pub fn with_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
		self.breaker = breaker;
		self
	}

	pub fn with_request_delay(mut self, delay: Duration) -> Self {
		self.request_delay = delay;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn breaker(&self) -> &CircuitBreaker {
		&self.breaker
	}

	/// Number of HTTP requests sent so far, retries included.
	pub fn request_count(&self) -> u64 {
		self.request_count.load(Ordering::Relaxed)
	}

	/// Fetches one page of search results.
	#[instrument(skip(self), fields(keyword = %query.keyword, page = query.page))]
	pub async fn search_page(&self, query: &SearchQuery) -> Result<SearchPage, UsaJobsError> {
		let params = query.to_params();

		let page = retry(&self.retry_config, || {
			self.breaker.call(|| self.search_inner(&params))
		})
		.await?;

		if !self.request_delay.is_zero() {
			debug!(
				delay_ms = self.request_delay.as_millis() as u64,
				"throttling before next request"
			);
			tokio::time::sleep(self.request_delay).await;
		}

		Ok(page)
	}

	async fn search_inner(&self, params: &[(&'static str, String)]) -> Result<SearchPage, UsaJobsError> {
		let request_no = self.request_count.fetch_add(1, Ordering::Relaxed) + 1;
		info!(request_no, url = %self.base_url, "Sending search request to USAJOBS");
		trace!(?params, "Search parameters");

		let response = self
			.http_client
			.get(&self.base_url)
			.query(params)
			.header("Authorization-Key", self.api_key.expose_secret())
			.timeout(self.timeout)
			.send()
			.await
			.map_err(map_send_error)?;

		let status = response.status();
		debug!(status = %status, "Received response from USAJOBS");

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(status_error(status, body));
		}

		let body = response.text().await.map_err(map_send_error)?;
		trace!(bytes = body.len(), "Response body received");

		let page: SearchPage = serde_json::from_str(&body).map_err(|e| {
			error!(error = %e, "Failed to parse USAJOBS response");
			UsaJobsError::InvalidResponse(format!("JSON parse error: {e}"))
		})?;

		debug!(
			items = page.items_on_page(),
			count_on_page = page.count_on_page(),
			count_all = page.count_all(),
			"Search page decoded"
		);

		Ok(page)
	}
}

fn map_send_error(e: reqwest::Error) -> UsaJobsError {
	if e.is_timeout() {
		error!("Request timed out");
		return UsaJobsError::Timeout;
	}
	error!(error = %e, "Network error during USAJOBS request");
	UsaJobsError::Network(e)
}

fn status_error(status: StatusCode, body: String) -> UsaJobsError {
	let status_code = status.as_u16();

	if status == StatusCode::TOO_MANY_REQUESTS {
		error!(status = status_code, "Rate limit exceeded");
		return UsaJobsError::RateLimited;
	}

	if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
		let lower = body.to_lowercase();
		if lower.contains("rate") || lower.contains("quota") || lower.contains("limit") {
			error!(status = status_code, "Rate limit exceeded");
			return UsaJobsError::RateLimited;
		}
		error!(status = status_code, "Unauthorized request");
		return UsaJobsError::Unauthorized;
	}

	error!(status = status_code, body = %body, "USAJOBS API error");
	UsaJobsError::ApiError {
		status: status_code,
		message: body,
	}
}
