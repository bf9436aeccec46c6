// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Job posting repository for database operations.
//!
//! Postings are keyed by `position_uri`. Writes go through a single
//! transaction per batch so a failed batch leaves no partial rows behind.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobtide_common_core::JobPosting;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::error::{DbError, Result};

/// Rows per INSERT statement. Eleven binds per row keeps this well under the
/// 65535 bind-parameter limit.
const UPSERT_CHUNK_SIZE: usize = 1000;

/// Per-batch insert/update accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertCounts {
	pub inserted: u64,
	pub updated: u64,
	pub total: u64,
}

impl UpsertCounts {
	pub fn from_flags(flags: impl IntoIterator<Item = bool>) -> Self {
		let mut counts = Self::default();
		for inserted in flags {
			if inserted {
				counts.inserted += 1;
			} else {
				counts.updated += 1;
			}
			counts.total += 1;
		}
		counts
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingStatistics {
	pub total_postings: i64,
	pub unique_organizations: i64,
	pub postings_today: i64,
	pub postings_this_week: i64,
	pub first_created_at: Option<DateTime<Utc>>,
	pub last_created_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait PostingStore: Send + Sync {
	/// Idempotently creates the backing schema.
	async fn ensure_schema(&self) -> Result<()>;

	/// Inserts or fully overwrites each posting, keyed by `position_uri`.
	///
	/// Keys must be unique within `postings`; a repeated key fails the whole
	/// batch with [`DbError::Conflict`] before anything is written.
	async fn upsert_many(&self, postings: &[JobPosting]) -> Result<UpsertCounts>;

	async fn statistics(&self) -> Result<PostingStatistics>;
}

/// Returns the first key that appears twice in `postings`.
pub(crate) fn first_duplicate_key(postings: &[JobPosting]) -> Option<&str> {
	let mut seen = HashSet::with_capacity(postings.len());
	postings
		.iter()
		.map(|p| p.position_uri.as_str())
		.find(|uri| !seen.insert(*uri))
}

#[derive(Clone)]
pub struct PostingRepository {
	pool: PgPool,
}

impl PostingRepository {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}

	#[tracing::instrument(skip(self, postings), fields(count = postings.len()))]
	pub async fn upsert_many(&self, postings: &[JobPosting]) -> Result<UpsertCounts> {
		if postings.is_empty() {
			tracing::info!("No postings to upsert");
			return Ok(UpsertCounts::default());
		}
		if let Some(uri) = first_duplicate_key(postings) {
			return Err(DbError::Conflict(format!(
				"duplicate position_uri in batch: {uri}"
			)));
		}

		// Dropping the transaction without commit rolls it back.
		let mut tx = self.pool.begin().await?;
		let mut flags = Vec::with_capacity(postings.len());

		for chunk in postings.chunks(UPSERT_CHUNK_SIZE) {
			let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
				"INSERT INTO job_postings (position_title, position_uri, position_location, \
				 position_remuneration, position_start_date, position_end_date, organization_name, \
				 department_name, job_category, job_grade, extracted_at) ",
			);
			builder.push_values(chunk, |mut row, p| {
				row.push_bind(p.position_title.as_str())
					.push_bind(p.position_uri.as_str())
					.push_bind(p.position_location.as_deref())
					.push_bind(p.position_remuneration.as_deref())
					.push_bind(p.position_start_date)
					.push_bind(p.position_end_date)
					.push_bind(p.organization_name.as_deref())
					.push_bind(p.department_name.as_deref())
					.push_bind(p.job_category.as_deref())
					.push_bind(p.job_grade.as_deref())
					.push_bind(p.extracted_at);
			});
			builder.push(
				r#"
				ON CONFLICT (position_uri) DO UPDATE SET
					position_title = EXCLUDED.position_title,
					position_location = EXCLUDED.position_location,
					position_remuneration = EXCLUDED.position_remuneration,
					position_start_date = EXCLUDED.position_start_date,
					position_end_date = EXCLUDED.position_end_date,
					organization_name = EXCLUDED.organization_name,
					department_name = EXCLUDED.department_name,
					job_category = EXCLUDED.job_category,
					job_grade = EXCLUDED.job_grade,
					extracted_at = EXCLUDED.extracted_at,
					updated_at = CURRENT_TIMESTAMP
				RETURNING (xmax = 0) AS inserted
				"#,
			);

			let inserted: Vec<bool> = builder
				.build_query_scalar::<bool>()
				.fetch_all(&mut *tx)
				.await?;
			flags.extend(inserted);
		}

		tx.commit().await?;

		let counts = UpsertCounts::from_flags(flags);
		tracing::info!(
			inserted = counts.inserted,
			updated = counts.updated,
			total = counts.total,
			"Database upsert completed"
		);
		Ok(counts)
	}

	#[tracing::instrument(skip(self))]
	pub async fn statistics(&self) -> Result<PostingStatistics> {
		let row = sqlx::query(
			r#"
			SELECT
				COUNT(*) AS total_postings,
				COUNT(DISTINCT organization_name) AS unique_organizations,
				COUNT(*) FILTER (WHERE created_at >= CURRENT_DATE) AS postings_today,
				COUNT(*) FILTER (WHERE created_at >= CURRENT_DATE - INTERVAL '7 days') AS postings_this_week,
				MIN(created_at) AS first_created_at,
				MAX(created_at) AS last_created_at
			FROM job_postings
			"#,
		)
		.fetch_one(&self.pool)
		.await?;

		Ok(PostingStatistics {
			total_postings: row.try_get("total_postings")?,
			unique_organizations: row.try_get("unique_organizations")?,
			postings_today: row.try_get("postings_today")?,
			postings_this_week: row.try_get("postings_this_week")?,
			first_created_at: row.try_get("first_created_at")?,
			last_created_at: row.try_get("last_created_at")?,
		})
	}
}

#[async_trait]
impl PostingStore for PostingRepository {
	async fn ensure_schema(&self) -> Result<()> {
		crate::schema::ensure_schema(&self.pool).await
	}

	async fn upsert_many(&self, postings: &[JobPosting]) -> Result<UpsertCounts> {
		self.upsert_many(postings).await
	}

	async fn statistics(&self) -> Result<PostingStatistics> {
		self.statistics().await
	}
}
