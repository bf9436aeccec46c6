// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wires configuration into the client, store and pipeline.

use std::sync::Arc;

use anyhow::Context;
use jobtide_config::{JobtideConfig, SearchConfig};
use jobtide_db::{create_pool, PostingRepository};
use jobtide_etl::{Pipeline, SearchPlan};
use jobtide_usajobs::UsaJobsClient;
use tracing::info;

pub async fn connect_store(config: &JobtideConfig) -> anyhow::Result<PostingRepository> {
	let pool = create_pool(&config.database)
		.await
		.context("failed to connect to Postgres")?;
	Ok(PostingRepository::new(pool))
}

pub async fn build_pipeline(mut config: JobtideConfig) -> anyhow::Result<Pipeline> {
	let api_key = config.api.take_api_key()?;
	let client = UsaJobsClient::new(api_key, config.api.user_agent.clone())?
		.with_base_url(config.api.base_url.clone())
		.with_request_delay(config.api.request_delay)
		.with_timeout(config.api.timeout)
		.with_retry_config(config.resilience.retry.clone())
		.with_breaker_config(config.resilience.breaker.clone());

	let store = connect_store(&config).await?;
	info!(base_url = %config.api.base_url, "Pipeline ready");

	Ok(
		Pipeline::new(Arc::new(client), Arc::new(store), search_plan(&config.search))
			.with_store_retry(config.resilience.retry.clone()),
	)
}

fn search_plan(search: &SearchConfig) -> SearchPlan {
	SearchPlan {
		keyword: search.keyword.clone(),
		location: search.location.clone(),
		max_pages: search.max_pages,
		results_per_page: search.results_per_page,
	}
}
