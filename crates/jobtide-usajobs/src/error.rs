// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the USAJOBS API client.

use jobtide_common_http::{classify_status, CircuitOpen, ClassifiedError, FailureKind};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when interacting with the USAJOBS API.
#[derive(Debug, Error)]
pub enum UsaJobsError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request exceeded the per-request timeout.
	#[error("Request timed out")]
	Timeout,

	/// Rate limit exceeded.
	#[error("Rate limit exceeded")]
	RateLimited,

	/// Invalid API key.
	#[error("Invalid API key")]
	Unauthorized,

	/// Response body could not be decoded.
	#[error("Invalid response from USAJOBS: {0}")]
	InvalidResponse(String),

	/// USAJOBS returned a non-success status.
	#[error("USAJOBS API error: {status} - {message}")]
	ApiError { status: u16, message: String },

	/// The circuit breaker rejected the call without contacting the API.
	#[error("Circuit breaker is open")]
	CircuitOpen,
}

impl From<CircuitOpen> for UsaJobsError {
	fn from(_: CircuitOpen) -> Self {
		UsaJobsError::CircuitOpen
	}
}

impl ClassifiedError for UsaJobsError {
	fn kind(&self) -> FailureKind {
		match self {
			UsaJobsError::Network(e) => e.kind(),
			UsaJobsError::Timeout => FailureKind::Transient,
			UsaJobsError::RateLimited => FailureKind::RateLimited,
			UsaJobsError::Unauthorized => FailureKind::Fatal,
			UsaJobsError::InvalidResponse(_) => FailureKind::Transient,
			UsaJobsError::ApiError { status, .. } => StatusCode::from_u16(*status)
				.map(classify_status)
				.unwrap_or(FailureKind::Transient),
			UsaJobsError::CircuitOpen => FailureKind::Transient,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_classification() {
		assert_eq!(UsaJobsError::Timeout.kind(), FailureKind::Transient);
		assert_eq!(UsaJobsError::RateLimited.kind(), FailureKind::RateLimited);
		assert_eq!(UsaJobsError::Unauthorized.kind(), FailureKind::Fatal);
		assert_eq!(UsaJobsError::CircuitOpen.kind(), FailureKind::Transient);
		assert_eq!(
			UsaJobsError::InvalidResponse("eof".into()).kind(),
			FailureKind::Transient
		);
		assert_eq!(
			UsaJobsError::ApiError {
				status: 503,
				message: String::new()
			}
			.kind(),
			FailureKind::Transient
		);
	}

	#[test]
	fn test_circuit_open_converts() {
		let err: UsaJobsError = CircuitOpen.into();
		assert!(matches!(err, UsaJobsError::CircuitOpen));
		assert_eq!(err.to_string(), "Circuit breaker is open");
	}
}
