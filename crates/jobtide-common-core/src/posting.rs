// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Canonical job posting record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostingValidationError {
	#[error("position title is blank")]
	BlankTitle,

	#[error("position URI is blank")]
	BlankUri,

	#[error("position URI is not an absolute http(s) URL: {0}")]
	InvalidUri(String),
}

/// A job posting normalized from an upstream listing.
///
/// `position_uri` is the natural key: two postings with the same URI are the
/// same listing, across pages and across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
	pub position_title: String,
	pub position_uri: String,
	pub position_location: Option<String>,
	pub position_remuneration: Option<String>,
	pub position_start_date: Option<NaiveDate>,
	pub position_end_date: Option<NaiveDate>,
	pub organization_name: Option<String>,
	pub department_name: Option<String>,
	pub job_category: Option<String>,
	pub job_grade: Option<String>,
	pub extracted_at: DateTime<Utc>,
}

impl JobPosting {
	/// Creates a posting with only the required fields set.
	pub fn new(
		position_title: impl Into<String>,
		position_uri: impl Into<String>,
		extracted_at: DateTime<Utc>,
	) -> Self {
		Self {
			position_title: position_title.into(),
			position_uri: position_uri.into(),
			position_location: None,
			position_remuneration: None,
			position_start_date: None,
			position_end_date: None,
			organization_name: None,
			department_name: None,
			job_category: None,
			job_grade: None,
			extracted_at,
		}
	}

	pub fn validate(&self) -> Result<(), PostingValidationError> {
		if self.position_title.trim().is_empty() {
			return Err(PostingValidationError::BlankTitle);
		}

		let uri = self.position_uri.trim();
		if uri.is_empty() {
			return Err(PostingValidationError::BlankUri);
		}

		match Url::parse(uri) {
			Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
			_ => Err(PostingValidationError::InvalidUri(uri.to_string())),
		}
	}

	pub fn is_valid(&self) -> bool {
		self.validate().is_ok()
	}
}
