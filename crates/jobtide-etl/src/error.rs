// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use jobtide_db::DbError;
use thiserror::Error;

/// Errors that abort a run. Page-level fetch failures are not here; they are
/// collected into the run summary instead.
#[derive(Debug, Error)]
pub enum EtlError {
	#[error("Schema setup failed: {0}")]
	Schema(#[source] DbError),

	#[error("Load failed: {0}")]
	Load(#[source] DbError),
}

pub type Result<T> = std::result::Result<T, EtlError>;
