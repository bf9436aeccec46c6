// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Run orchestration: schema, extraction, load, statistics.

use std::sync::Arc;
use std::time::Duration;

use jobtide_common_http::{retry, RetryConfig};
use jobtide_db::{PostingStatistics, PostingStore};
use serde::{Serialize, Serializer};
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::error::{EtlError, Result};
use crate::load::load_postings;
use crate::paginate::{paginate, SearchPlan};
use crate::source::PageSource;

/// Per-run overrides; unset fields fall back to the pipeline's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
	pub keyword: Option<String>,
	pub location: Option<String>,
	pub max_pages: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
	#[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
	pub duration: Duration,
	pub pages_fetched: u32,
	pub api_requests: u64,
	pub records_extracted: u64,
	pub inserted: u64,
	pub updated: u64,
	/// Rows in the store after the load; `None` when statistics were unavailable.
	pub total_in_store: Option<i64>,
	pub errors: Vec<String>,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
	serializer.serialize_f64(duration.as_secs_f64())
}

/// Pulls postings from a [`PageSource`] into a [`PostingStore`].
pub struct Pipeline {
	source: Arc<dyn PageSource>,
	store: Arc<dyn PostingStore>,
	defaults: SearchPlan,
	store_retry: RetryConfig,
}

impl Pipeline {
	pub fn new(source: Arc<dyn PageSource>, store: Arc<dyn PostingStore>, defaults: SearchPlan) -> Self {
		Self {
			source,
			store,
			defaults,
			store_retry: RetryConfig::default(),
		}
	}

	/// Retry policy for schema setup and loads.
	pub fn with_store_retry(mut self, config: RetryConfig) -> Self {
		self.store_retry = config;
		self
	}

	pub fn defaults(&self) -> &SearchPlan {
		&self.defaults
	}

	fn plan_for(&self, request: RunRequest) -> SearchPlan {
		SearchPlan {
			keyword: request.keyword.unwrap_or_else(|| self.defaults.keyword.clone()),
			location: request
				.location
				.filter(|l| !l.trim().is_empty())
				.or_else(|| self.defaults.location.clone()),
			max_pages: request.max_pages.unwrap_or(self.defaults.max_pages),
			results_per_page: self.defaults.results_per_page,
		}
	}

	/// Executes one run.
	///
	/// Page failures are collected into the summary. Schema and load failures
	/// abort the run.
	#[instrument(skip(self))]
	pub async fn run(&self, request: RunRequest) -> Result<RunSummary> {
		let started = Instant::now();
		let requests_before = self.source.request_count();
		let plan = self.plan_for(request);

		info!(
			keyword = %plan.keyword,
			location = plan.location.as_deref().unwrap_or("-"),
			max_pages = plan.max_pages,
			"Starting ETL run"
		);

		retry(&self.store_retry, || self.store.ensure_schema())
			.await
			.map_err(EtlError::Schema)?;

		if let Some(stats) = self.statistics().await {
			info!(
				total = stats.total_postings,
				organizations = stats.unique_organizations,
				"Initial store statistics"
			);
		}

		let extraction = paginate(self.source.as_ref(), &plan).await;
		let records_extracted = extraction.postings.len() as u64;

		let counts = load_postings(self.store.as_ref(), extraction.postings, &self.store_retry)
			.await
			.map_err(EtlError::Load)?;

		let total_in_store = self.statistics().await.map(|s| s.total_postings);

		let summary = RunSummary {
			duration: started.elapsed(),
			pages_fetched: extraction.pages_fetched,
			api_requests: self.source.request_count().saturating_sub(requests_before),
			records_extracted,
			inserted: counts.inserted,
			updated: counts.updated,
			total_in_store,
			errors: extraction.errors,
		};

		info!(
			duration_secs = summary.duration.as_secs_f64(),
			pages = summary.pages_fetched,
			api_requests = summary.api_requests,
			extracted = summary.records_extracted,
			inserted = summary.inserted,
			updated = summary.updated,
			errors = summary.errors.len(),
			"ETL run completed"
		);
		Ok(summary)
	}

	/// Statistics are informational; a failure is logged, not propagated.
	async fn statistics(&self) -> Option<PostingStatistics> {
		match self.store.statistics().await {
			Ok(stats) => Some(stats),
			Err(e) => {
				warn!(error = %e, "Failed to read store statistics");
				None
			}
		}
	}
}
