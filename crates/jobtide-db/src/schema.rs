// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Idempotent DDL for the `job_postings` table and its companions.

use sqlx::PgPool;

use crate::error::Result;

const SCHEMA_STATEMENTS: &[&str] = &[
	r#"
	CREATE TABLE IF NOT EXISTS job_postings (
		id SERIAL PRIMARY KEY,
		position_title TEXT NOT NULL,
		position_uri TEXT NOT NULL UNIQUE,
		position_location TEXT,
		position_remuneration TEXT,
		position_start_date DATE,
		position_end_date DATE,
		organization_name TEXT,
		department_name TEXT,
		job_category TEXT,
		job_grade TEXT,
		extracted_at TIMESTAMP WITH TIME ZONE NOT NULL,
		created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP,
		updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP
	)
	"#,
	"CREATE INDEX IF NOT EXISTS idx_job_postings_title ON job_postings USING gin(to_tsvector('english', position_title))",
	"CREATE INDEX IF NOT EXISTS idx_job_postings_location ON job_postings(position_location)",
	"CREATE INDEX IF NOT EXISTS idx_job_postings_created_at ON job_postings(created_at DESC)",
	"CREATE INDEX IF NOT EXISTS idx_job_postings_organization ON job_postings(organization_name)",
	r#"
	CREATE OR REPLACE VIEW recent_job_postings AS
	SELECT
		id,
		position_title,
		position_location,
		position_remuneration,
		organization_name,
		department_name,
		job_category,
		created_at,
		updated_at
	FROM job_postings
	WHERE created_at >= CURRENT_DATE - INTERVAL '30 days'
	ORDER BY created_at DESC
	"#,
];

/// Creates the table, indexes and view if missing, all in one transaction.
#[tracing::instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
	let mut tx = pool.begin().await?;
	for statement in SCHEMA_STATEMENTS {
		sqlx::query(*statement).execute(&mut *tx).await?;
	}
	tx.commit().await?;

	tracing::info!("Database schema created/verified");
	Ok(())
}
