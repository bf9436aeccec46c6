// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use jobtide_common_http::{ClassifiedError, FailureKind};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Database unavailable: {0}")]
	Unavailable(String),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// SQLSTATE classes worth retrying: connection exceptions (08), transaction
/// rollbacks such as serialization failures and deadlocks (40), and operator
/// intervention like admin shutdown (57).
const TRANSIENT_SQLSTATE_CLASSES: &[&str] = &["08", "40", "57"];

impl ClassifiedError for DbError {
	fn kind(&self) -> FailureKind {
		match self {
			DbError::Sqlx(e) => classify_sqlx(e),
			DbError::Unavailable(_) => FailureKind::Transient,
			DbError::Conflict(_) | DbError::Internal(_) => FailureKind::Fatal,
		}
	}
}

fn classify_sqlx(err: &sqlx::Error) -> FailureKind {
	match err {
		sqlx::Error::Io(_)
		| sqlx::Error::Tls(_)
		| sqlx::Error::Protocol(_)
		| sqlx::Error::PoolTimedOut
		| sqlx::Error::WorkerCrashed => FailureKind::Transient,
		sqlx::Error::Database(db) => match db.code() {
			Some(code) if TRANSIENT_SQLSTATE_CLASSES.iter().any(|c| code.starts_with(c)) => {
				FailureKind::Transient
			}
			_ => FailureKind::Fatal,
		},
		_ => FailureKind::Fatal,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_classification() {
		assert_eq!(
			DbError::Unavailable("down".into()).kind(),
			FailureKind::Transient
		);
		assert_eq!(DbError::Conflict("dup".into()).kind(), FailureKind::Fatal);
		assert_eq!(DbError::Sqlx(sqlx::Error::PoolTimedOut).kind(), FailureKind::Transient);
		assert_eq!(DbError::Sqlx(sqlx::Error::RowNotFound).kind(), FailureKind::Fatal);
		assert!(!DbError::Internal("bug".into()).is_retryable());
	}
}
