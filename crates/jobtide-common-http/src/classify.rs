// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Failure classification for remote calls.

use reqwest::StatusCode;

/// Closed set of failure classes a remote call can end in.
///
/// Callers branch on this instead of inspecting error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
	/// Timeouts, connection resets, 5xx and similar; worth trying again.
	Transient,
	/// The upstream is throttling us. Continuing would make things worse.
	RateLimited,
	/// Retrying cannot help (bad credentials, malformed request).
	Fatal,
}

impl FailureKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			FailureKind::Transient => "transient",
			FailureKind::RateLimited => "rate_limited",
			FailureKind::Fatal => "fatal",
		}
	}
}

impl std::fmt::Display for FailureKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

pub trait ClassifiedError {
	fn kind(&self) -> FailureKind;

	/// Whether [`crate::retry`] should make another attempt.
	fn is_retryable(&self) -> bool {
		self.kind() != FailureKind::Fatal
	}
}

/// Maps an HTTP status to a failure class.
pub fn classify_status(status: StatusCode) -> FailureKind {
	match status {
		StatusCode::TOO_MANY_REQUESTS => FailureKind::RateLimited,
		StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Fatal,
		_ => FailureKind::Transient,
	}
}

impl ClassifiedError for reqwest::Error {
	fn kind(&self) -> FailureKind {
		if self.is_builder() {
			return FailureKind::Fatal;
		}

		match self.status() {
			Some(status) => classify_status(status),
			None => FailureKind::Transient,
		}
	}
}
