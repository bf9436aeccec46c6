// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use jobtide_usajobs::{SearchPage, SearchQuery, UsaJobsClient, UsaJobsError};

/// Anything that can serve search result pages.
#[async_trait]
pub trait PageSource: Send + Sync {
	async fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage, UsaJobsError>;

	/// Remote requests issued so far, retries included.
	fn request_count(&self) -> u64;
}

#[async_trait]
impl PageSource for UsaJobsClient {
	async fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage, UsaJobsError> {
		self.search_page(query).await
	}

	fn request_count(&self) -> u64 {
		UsaJobsClient::request_count(self)
	}
}
