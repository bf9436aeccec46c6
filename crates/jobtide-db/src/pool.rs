// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use jobtide_config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;

use crate::error::DbError;

pub const APPLICATION_NAME: &str = "jobtide";

/// Create a PgPool tagged with the `jobtide` application name.
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid, or `DbError::Sqlx` if
/// no connection can be established within the configured timeout.
#[tracing::instrument(skip(config), fields(max_connections = config.max_connections))]
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
	let options = PgConnectOptions::from_str(config.url.expose_secret())
		.map_err(|_| DbError::Internal("Invalid database URL".to_string()))?
		.application_name(APPLICATION_NAME);

	let pool = PgPoolOptions::new()
		.max_connections(config.max_connections)
		.acquire_timeout(config.connect_timeout)
		.connect_with(options)
		.await?;

	tracing::debug!("database pool created");
	Ok(pool)
}
