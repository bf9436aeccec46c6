// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deduplicate-then-upsert accounting.

use std::collections::HashSet;

use jobtide_common_core::JobPosting;
use jobtide_common_http::{retry, RetryConfig};
use jobtide_db::{DbError, PostingStore, UpsertCounts};
use tracing::{debug, info, instrument};

/// Keeps the first posting for each `position_uri`, preserving input order.
pub fn dedup_postings(postings: Vec<JobPosting>) -> Vec<JobPosting> {
	let before = postings.len();
	let mut seen = HashSet::with_capacity(before);
	let unique: Vec<JobPosting> = postings
		.into_iter()
		.filter(|p| {
			let fresh = seen.insert(p.position_uri.clone());
			if !fresh {
				debug!(uri = %p.position_uri, "Skipping duplicate job URI");
			}
			fresh
		})
		.collect();

	if unique.len() < before {
		info!(before, after = unique.len(), "Deduplicated postings");
	}
	unique
}

/// Deduplicates `postings` and upserts them in one store transaction.
///
/// An empty batch returns zero counts without touching the store. Retryable
/// store failures are retried per `retry_config`; since each attempt is a
/// whole transaction, a failed attempt leaves nothing behind.
#[instrument(skip(store, postings, retry_config), fields(count = postings.len()))]
pub async fn load_postings(
	store: &dyn PostingStore,
	postings: Vec<JobPosting>,
	retry_config: &RetryConfig,
) -> Result<UpsertCounts, DbError> {
	let unique = dedup_postings(postings);
	if unique.is_empty() {
		info!("No postings to load");
		return Ok(UpsertCounts::default());
	}

	let counts = retry(retry_config, || store.upsert_many(&unique)).await?;
	info!(
		inserted = counts.inserted,
		updated = counts.updated,
		total = counts.total,
		"Postings loaded"
	);
	Ok(counts)
}
