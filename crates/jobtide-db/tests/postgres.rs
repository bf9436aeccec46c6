// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository tests against a live Postgres. Skipped unless
//! `JOBTIDE_TEST_DATABASE_URL` points at a disposable database.

use std::time::Duration;

use chrono::Utc;
use jobtide_common_core::JobPosting;
use jobtide_config::DatabaseConfig;
use jobtide_db::{create_pool, DbError, PostingRepository, PostingStore};
use secrecy::SecretString;

async fn repository() -> Option<PostingRepository> {
	let url = std::env::var("JOBTIDE_TEST_DATABASE_URL").ok()?;
	let config = DatabaseConfig {
		url: SecretString::from(url),
		max_connections: 2,
		connect_timeout: Duration::from_secs(10),
	};
	let pool = create_pool(&config).await.unwrap();
	let repo = PostingRepository::new(pool);
	repo.ensure_schema().await.unwrap();
	sqlx::query("TRUNCATE job_postings")
		.execute(repo.pool())
		.await
		.unwrap();
	Some(repo)
}

fn batch(prefix: &str, n: usize) -> Vec<JobPosting> {
	(0..n)
		.map(|i| {
			let mut p = JobPosting::new(
				"Data Engineer",
				format!("https://www.usajobs.gov/job/{prefix}-{i}"),
				Utc::now(),
			);
			p.organization_name = Some(format!("Agency {}", i % 3));
			p
		})
		.collect()
}

// One test body so runs against the shared table stay sequential.
#[tokio::test]
async fn test_repository_against_postgres() {
	let Some(repo) = repository().await else {
		eprintln!("JOBTIDE_TEST_DATABASE_URL not set; skipping");
		return;
	};

	// Schema ensure is idempotent.
	repo.ensure_schema().await.unwrap();

	// Spans multiple insert chunks.
	let postings = batch("a", 1500);
	let first = repo.upsert_many(&postings).await.unwrap();
	assert_eq!((first.inserted, first.updated, first.total), (1500, 0, 1500));

	let second = repo.upsert_many(&postings).await.unwrap();
	assert_eq!((second.inserted, second.updated, second.total), (0, 1500, 1500));

	let mut mixed = batch("a", 2);
	mixed[0].position_title = "Senior Data Engineer".to_string();
	mixed.extend(batch("b", 3));
	let third = repo.upsert_many(&mixed).await.unwrap();
	assert_eq!((third.inserted, third.updated), (3, 2));

	let title: String =
		sqlx::query_scalar("SELECT position_title FROM job_postings WHERE position_uri = $1")
			.bind(&mixed[0].position_uri)
			.fetch_one(repo.pool())
			.await
			.unwrap();
	assert_eq!(title, "Senior Data Engineer");

	let mut duplicated = batch("c", 2);
	duplicated.push(duplicated[0].clone());
	let err = repo.upsert_many(&duplicated).await.unwrap_err();
	assert!(matches!(err, DbError::Conflict(_)));

	let stats = repo.statistics().await.unwrap();
	assert_eq!(stats.total_postings, 1503);
	assert_eq!(stats.unique_organizations, 3);
	assert_eq!(stats.postings_today, 1503);
	assert!(stats.first_created_at.is_some());

	let empty = repo.upsert_many(&[]).await.unwrap();
	assert_eq!(empty.total, 0);
}
