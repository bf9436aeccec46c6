// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory [`PostingStore`] for tests.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jobtide_common_core::JobPosting;

use crate::error::{DbError, Result};
use crate::posting::{first_duplicate_key, PostingStatistics, PostingStore, UpsertCounts};

#[derive(Debug, Clone)]
struct StoredPosting {
	posting: JobPosting,
	created_at: DateTime<Utc>,
	updated_at: DateTime<Utc>,
}

/// Mirrors [`crate::PostingRepository`] insert/update semantics on a map.
///
/// Failures can be injected with [`fail_next_upserts`](Self::fail_next_upserts);
/// an injected failure surfaces as a retryable [`DbError::Unavailable`] and
/// leaves the stored rows untouched.
#[derive(Debug, Default)]
pub struct InMemoryPostingStore {
	rows: Mutex<HashMap<String, StoredPosting>>,
	pending_failures: AtomicU32,
	upsert_calls: AtomicU64,
	schema_calls: AtomicU64,
}

impl InMemoryPostingStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes the next `n` `upsert_many` calls fail.
	pub fn fail_next_upserts(&self, n: u32) {
		self.pending_failures.store(n, Ordering::SeqCst);
	}

	pub fn upsert_calls(&self) -> u64 {
		self.upsert_calls.load(Ordering::SeqCst)
	}

	pub fn schema_calls(&self) -> u64 {
		self.schema_calls.load(Ordering::SeqCst)
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn get(&self, position_uri: &str) -> Option<JobPosting> {
		self.lock().get(position_uri).map(|row| row.posting.clone())
	}

	/// Returns `(created_at, updated_at)` for a stored posting.
	pub fn timestamps(&self, position_uri: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
		self
			.lock()
			.get(position_uri)
			.map(|row| (row.created_at, row.updated_at))
	}

	fn lock(&self) -> MutexGuard<'_, HashMap<String, StoredPosting>> {
		self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn take_injected_failure(&self) -> bool {
		self
			.pending_failures
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok()
	}
}

#[async_trait]
impl PostingStore for InMemoryPostingStore {
	async fn ensure_schema(&self) -> Result<()> {
		self.schema_calls.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn upsert_many(&self, postings: &[JobPosting]) -> Result<UpsertCounts> {
		self.upsert_calls.fetch_add(1, Ordering::SeqCst);

		if self.take_injected_failure() {
			return Err(DbError::Unavailable("injected failure".to_string()));
		}
		if let Some(uri) = first_duplicate_key(postings) {
			return Err(DbError::Conflict(format!(
				"duplicate position_uri in batch: {uri}"
			)));
		}

		let now = Utc::now();
		let mut rows = self.lock();
		let flags: Vec<bool> = postings
			.iter()
			.map(|posting| match rows.entry(posting.position_uri.clone()) {
				Entry::Occupied(mut entry) => {
					let row = entry.get_mut();
					row.posting = posting.clone();
					row.updated_at = now;
					false
				}
				Entry::Vacant(entry) => {
					entry.insert(StoredPosting {
						posting: posting.clone(),
						created_at: now,
						updated_at: now,
					});
					true
				}
			})
			.collect();

		Ok(UpsertCounts::from_flags(flags))
	}

	async fn statistics(&self) -> Result<PostingStatistics> {
		let rows = self.lock();
		let today = Utc::now()
			.date_naive()
			.and_hms_opt(0, 0, 0)
			.map(|midnight| midnight.and_utc())
			.ok_or_else(|| DbError::Internal("invalid midnight".to_string()))?;
		let week_start = today - Duration::days(7);

		let mut organizations = HashSet::new();
		let mut stats = PostingStatistics {
			total_postings: rows.len() as i64,
			..Default::default()
		};

		for row in rows.values() {
			if let Some(org) = &row.posting.organization_name {
				organizations.insert(org.as_str());
			}
			if row.created_at >= today {
				stats.postings_today += 1;
			}
			if row.created_at >= week_start {
				stats.postings_this_week += 1;
			}
			stats.first_created_at = Some(match stats.first_created_at {
				Some(first) => first.min(row.created_at),
				None => row.created_at,
			});
			stats.last_created_at = Some(match stats.last_created_at {
				Some(last) => last.max(row.created_at),
				None => row.created_at,
			});
		}
		stats.unique_organizations = organizations.len() as i64;

		Ok(stats)
	}
}
